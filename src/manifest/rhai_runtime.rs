use rhai::{Dynamic, Engine, FnPtr, Scope, AST};
use serde_json::Value;

use crate::manifest::RawManifest;

/// Name of a zero-argument script function that produces the questions.
const FACTORY_FN: &str = "questions";

/// Create a sandboxed Rhai engine for template manifests.
pub fn create_engine() -> Engine {
    let mut engine = Engine::new();

    // Limit recursion and operations for safety
    engine.set_max_call_levels(32);
    engine.set_max_operations(100_000);
    engine.set_max_string_size(10 * 1024 * 1024); // 10MB

    engine
}

/// Variables visible to manifest scripts.
pub fn build_scope<'a>(directory_name: &str) -> Scope<'a> {
    let mut scope = Scope::new();
    scope.push_constant("directory_name", directory_name.to_string());
    scope
}

/// Evaluate a manifest script into a mapping or a deferred factory.
pub fn evaluate(script: &str, directory_name: &str) -> Result<RawManifest, String> {
    let engine = create_engine();
    let ast = engine.compile(script).map_err(|e| e.to_string())?;
    let mut scope = build_scope(directory_name);

    let result: Dynamic = engine
        .eval_ast_with_scope(&mut scope, &ast)
        .map_err(|e| e.to_string())?;

    if result.is::<FnPtr>() {
        let fn_ptr = result.cast::<FnPtr>();
        return Ok(RawManifest::Factory(Box::new(move || {
            let produced: Dynamic = fn_ptr.call(&engine, &ast, ()).map_err(|e| e.to_string())?;
            to_json(&produced)
        })));
    }

    let defines_factory = ast
        .iter_functions()
        .any(|f| f.name == FACTORY_FN && f.params.is_empty());

    if result.is_unit() && defines_factory {
        let directory_name = directory_name.to_string();
        return Ok(RawManifest::Factory(Box::new(move || {
            let mut scope = build_scope(&directory_name);
            let produced: Dynamic = engine
                .call_fn(&mut scope, &ast, FACTORY_FN, ())
                .map_err(|e| e.to_string())?;
            to_json(&produced)
        })));
    }

    to_json(&result).map(RawManifest::Mapping)
}

fn to_json(value: &Dynamic) -> Result<Value, String> {
    rhai::serde::from_dynamic::<Value>(value).map_err(|e| e.to_string())
}
