use std::sync::Arc;

use indexmap::IndexMap;
use mirage_script::{
    Interpreter, ModuleHost, ModuleImport, ModuleNamespace, ScriptError, ScriptResult, Value,
    evaluate_module, parse, render_to_string,
};

/// Host serving a small `react` stand-in and nothing else
struct ReactOnly {
    react: Arc<ModuleNamespace>,
}

impl ReactOnly {
    fn new() -> Self {
        let mut exports = IndexMap::new();
        exports.insert(
            "useState".to_string(),
            Value::native("useState", |_, args| {
                let initial = args.first().cloned().unwrap_or_default();
                Ok(Value::array(vec![
                    initial,
                    Value::native("setState", |_, _| Ok(Value::Undefined)),
                ]))
            }),
        );
        Self {
            react: Arc::new(ModuleNamespace::with_exports(exports)),
        }
    }
}

impl ModuleHost for ReactOnly {
    fn import(&mut self, specifier: &str, _: &mut Interpreter) -> ScriptResult<ModuleImport> {
        match specifier {
            "react" => Ok(ModuleImport {
                namespace: Arc::clone(&self.react),
                complete: true,
            }),
            other => Err(ScriptError::Import(other.to_string())),
        }
    }
}

fn render_module(source: &str) -> ScriptResult<String> {
    let program = parse(source)?;
    let namespace = Arc::new(ModuleNamespace::new());
    let mut interp = Interpreter::new();
    evaluate_module(&program, &namespace, &mut ReactOnly::new(), &mut interp)?;
    let component = namespace.get("default").unwrap_or_default();
    let element = interp.call(&component, &[Value::object(IndexMap::new())])?;
    render_to_string(&mut interp, &element)
}

#[test]
fn test_counter_component() {
    let result = render_module(
        r#"
        import { useState } from "react";

        const labels = { idle: "Ready", busy: "Working" };

        function Counter({ start = 0, status = "idle" }) {
            const [count, setCount] = useState(start);
            return (
                <section className="counter">
                    <h1>{labels[status]}</h1>
                    <button onClick={() => setCount(count + 1)}>Clicked {count} times</button>
                </section>
            );
        }

        export default function App() {
            const items = ["a", "b"];
            return (
                <>
                    <Counter start={2} />
                    <ul>
                        {items.map((item, index) => <li key={item}>{index + 1}. {item}</li>)}
                    </ul>
                </>
            );
        }
        "#,
    );
    match result {
        Ok(html) => assert_eq!(
            html,
            "<section class=\"counter\"><h1>Ready</h1><button>Clicked 2 times</button></section>\
             <ul><li>1. a</li><li>2. b</li></ul>"
        ),
        Err(e) => panic!("Failed: {:?}", e),
    }
}

#[test]
fn test_unknown_import_fails_linking() {
    let result = render_module(
        r#"
        import { motion } from "framer-motion";
        export default () => <motion.div />;
        "#,
    );
    match result {
        Err(ScriptError::Import(specifier)) => assert_eq!(specifier, "framer-motion"),
        other => panic!("Expected import failure, got {:?}", other),
    }
}

#[test]
fn test_thrown_error_surfaces_message() {
    let result = render_module(
        r#"
        export default function Broken() {
            throw new Error("no data");
        }
        "#,
    );
    match result {
        Err(e) => assert_eq!(e.to_string(), "Error: no data"),
        Ok(html) => panic!("Expected failure, rendered {}", html),
    }
}

#[test]
fn test_runaway_recursion_is_contained() {
    let program = parse(
        r#"
        export default function Loop(props) {
            return <Loop {...props} />;
        }
        "#,
    )
    .unwrap();
    let namespace = Arc::new(ModuleNamespace::new());
    let mut interp = Interpreter::with_max_depth(24);
    evaluate_module(&program, &namespace, &mut ReactOnly::new(), &mut interp).unwrap();
    let app = namespace.get("default").unwrap();
    let element = interp.call(&app, &[Value::object(IndexMap::new())]).unwrap();
    let err = render_to_string(&mut interp, &element).unwrap_err();
    assert!(matches!(err, ScriptError::Range(_)));
}
