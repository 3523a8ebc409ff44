use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_registration_order_resolves_shared_prefixes() {
    assert_eq!(Directive::find("ifdefined X"), Some((Directive::IfDefined, "X")));
    assert_eq!(Directive::find("if X"), Some((Directive::If, "X")));
    assert_eq!(Directive::find("endif"), Some((Directive::EndIf, "")));
    assert_eq!(Directive::find("end"), Some((Directive::End, "")));
    assert_eq!(Directive::find("exitif a > 1"), Some((Directive::ExitIf, "a > 1")));
    assert_eq!(Directive::find("exit"), Some((Directive::Exit, "")));
}

#[test]
fn test_names_are_case_insensitive() {
    assert_eq!(Directive::find("IF debug"), Some((Directive::If, "debug")));
    assert_eq!(Directive::find("EndIf"), Some((Directive::EndIf, "")));
}

#[test]
fn test_argument_presence_must_fit() {
    assert_eq!(Directive::find("if"), None);
    assert_eq!(Directive::find("else x"), None);
    assert_eq!(Directive::find("endif   "), Some((Directive::EndIf, "")));
    assert_eq!(Directive::find("ifx"), None);
}

#[test]
fn test_symbol_directives() {
    assert_eq!(Directive::find("-"), Some((Directive::OutputOff, "")));
    assert_eq!(Directive::find("+"), Some((Directive::OutputOn, "")));
    assert_eq!(Directive::find("//"), Some((Directive::CommentNextLine, "")));
}

#[test]
fn test_every_directive_is_reachable() {
    for directive in Directive::ALL {
        let line = if directive.takes_argument() {
            format!("{} x", directive.name())
        } else {
            directive.name().to_string()
        };
        assert_eq!(Directive::find(&line).map(|(d, _)| d), Some(directive), "{line}");
    }
}

#[test]
fn test_classify() {
    assert_eq!(DirectiveLine::classify("//#if x"), DirectiveLine::Directive("if x"));
    assert_eq!(DirectiveLine::classify("//  #if x"), DirectiveLine::Spaced("if x"));
    assert_eq!(DirectiveLine::classify("// plain comment"), DirectiveLine::Text);
    assert_eq!(DirectiveLine::classify("code();"), DirectiveLine::Text);

    assert_eq!(DirectiveLine::classify("//  #if x").body(false), None);
    assert_eq!(DirectiveLine::classify("//  #if x").body(true), Some("if x"));
}

#[test]
fn test_split_arguments() {
    assert_eq!(split_arguments(""), Vec::<&str>::new());
    assert_eq!(split_arguments("a"), vec!["a"]);
    assert_eq!(
        split_arguments(r#" a , "b,\"c" , f(1, 2) "#),
        vec!["a", r#""b,\"c""#, "f(1, 2)"]
    );
    assert_eq!(split_arguments("a,"), vec!["a", ""]);
}
