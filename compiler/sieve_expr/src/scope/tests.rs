use std::path::Path;

use super::*;
use crate::eval::evaluate;
use pretty_assertions::assert_eq;
use sieve_diagnostic::ErrorKind;

#[derive(Default)]
struct Recorder {
    actions: Vec<String>,
}

impl Extension for Recorder {
    fn action(&mut self, args: &[Value]) -> Result<()> {
        let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
        if rendered.first().is_some_and(|a| a == "fail") {
            return Err(extension_failure("refused"));
        }
        self.actions.push(rendered.join("|"));
        Ok(())
    }

    fn user_function_arity(&self, name: &str) -> Option<usize> {
        (name == "twice").then_some(1)
    }

    fn call_user_function(&mut self, _name: &str, args: &[Value]) -> Result<Value> {
        Ok(Value::Int(args[0].as_int()? * 2))
    }
}

fn scope_with_extension() -> Scope {
    let mut scope = Scope::new(Variables::new());
    scope.extension = Some(Box::new(Recorder::default()));
    scope
}

#[test]
fn test_user_function_call() {
    let mut scope = scope_with_extension();
    let value = evaluate("$twice(20) + 2", &mut scope.at(Site::default())).unwrap();
    assert_eq!(value.to_string(), "42");
}

#[test]
fn test_user_function_arity_and_unknown() {
    let mut scope = scope_with_extension();
    let err = evaluate("$twice(1, 2)", &mut scope.at(Site::default())).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Parse);
    assert!(err.message.contains("'$twice' expects 1"));

    let err = evaluate("$thrice(1)", &mut scope.at(Site::default())).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Parse);
}

#[test]
fn test_user_function_without_extension() {
    let mut scope = Scope::new(Variables::new());
    let err = evaluate("$twice(1)", &mut scope.at(Site::default())).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Extension);
}

#[test]
fn test_action_forwarding() {
    let mut scope = scope_with_extension();
    scope.action(&[Value::string("build"), Value::Int(3)]).unwrap();
    let err = scope.action(&[Value::string("fail")]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Extension);

    let mut bare = Scope::new(Variables::new());
    assert_eq!(
        bare.action(&[]).unwrap_err().kind,
        ErrorKind::Extension
    );
}

#[test]
fn test_resolve_path_is_relative_to_current_file() {
    let mut scope = Scope::new(Variables::new());
    let file = Path::new("/work/src/Main.java");
    let env = scope.at(Site {
        file: Some(file),
        root: Some(file),
        line: 1,
    });
    assert_eq!(env.resolve_path("data/a.xml"), Path::new("/work/src/data/a.xml"));
    assert_eq!(env.resolve_path("/abs/b.xml"), Path::new("/abs/b.xml"));
}
