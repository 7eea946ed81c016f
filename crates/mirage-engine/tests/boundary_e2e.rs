use std::cell::RefCell;
use std::rc::Rc;

use mirage_engine::{
    BoundaryState, Callbacks, ErrorBoundary, LoaderConfig, Mount, Previewer, Target,
    VirtualFileSet,
};

#[derive(Default)]
struct Events {
    errors: Vec<String>,
    successes: usize,
}

fn boundary(
    events: &Rc<RefCell<Events>>,
) -> ErrorBoundary<Callbacks<impl FnMut(&str), impl FnMut()>> {
    let on_error = Rc::clone(events);
    let on_success = Rc::clone(events);
    ErrorBoundary::new(Callbacks::new(
        move |message: &str| on_error.borrow_mut().errors.push(message.to_string()),
        move || on_success.borrow_mut().successes += 1,
    ))
}

fn artifact(source: &str) -> VirtualFileSet {
    VirtualFileSet::single("App.tsx", source).unwrap()
}

#[test]
fn test_throwing_artifact_shows_fallback() {
    let events = Rc::new(RefCell::new(Events::default()));
    let mut boundary = boundary(&events);
    let previewer = Previewer::new(Target::Material, LoaderConfig::default());
    let broken = artifact("export default function App() { throw new Error(\"no rows\"); }");

    let mount = previewer.preview(&broken, &mut boundary);
    match &mount {
        Mount::Fallback(html) => {
            assert!(html.starts_with("<div role=\"alert\" class=\"mirage-error\">"), "{}", html);
            assert!(html.contains("<pre>Error: no rows</pre>"), "{}", html);
            assert!(html.contains("<small>App.tsx</small>"), "{}", html);
        }
        Mount::Rendered(html) => panic!("Expected fallback, rendered {}", html),
    }
    assert_eq!(boundary.state(), BoundaryState::Faulted);

    // Re-rendering the same artifact keeps the fallback without re-reporting
    let again = previewer.preview(&broken, &mut boundary);
    assert_eq!(again, mount);
    assert_eq!(events.borrow().errors, vec!["Error: no rows".to_string()]);
    assert_eq!(events.borrow().successes, 0);
}

#[test]
fn test_new_artifact_clears_fault() {
    let events = Rc::new(RefCell::new(Events::default()));
    let mut boundary = boundary(&events);
    let previewer = Previewer::new(Target::Html, LoaderConfig::default());

    let broken = artifact("import x from 'left-pad'; export default () => <p>{x}</p>;");
    assert!(!previewer.preview(&broken, &mut boundary).is_rendered());
    assert!(boundary.is_faulted());

    let fixed = artifact("export default () => <p>ok</p>;");
    let mount = previewer.preview(&fixed, &mut boundary);
    assert_eq!(mount, Mount::Rendered("<p>ok</p>".to_string()));
    assert_eq!(boundary.state(), BoundaryState::Clear);

    // Success is reported once per artifact
    previewer.preview(&fixed, &mut boundary);
    let events = events.borrow();
    assert_eq!(events.errors.len(), 1);
    assert!(events.errors[0].contains("left-pad"));
    assert_eq!(events.successes, 1);
}

#[test]
fn test_reset_retries_same_artifact() {
    let events = Rc::new(RefCell::new(Events::default()));
    let mut boundary = boundary(&events);
    let previewer = Previewer::new(Target::Html, LoaderConfig::default());
    let broken = artifact("export default () => { throw new Error(\"flaky\"); };");

    previewer.preview(&broken, &mut boundary);
    boundary.reset();
    assert_eq!(boundary.state(), BoundaryState::Clear);
    previewer.preview(&broken, &mut boundary);
    assert_eq!(events.borrow().errors.len(), 2);
}

#[test]
fn test_runaway_recursion_is_contained() {
    let events = Rc::new(RefCell::new(Events::default()));
    let mut boundary = boundary(&events);
    let config = LoaderConfig {
        max_call_depth: 32,
        ..LoaderConfig::default()
    };
    let previewer = Previewer::new(Target::Html, config);
    let looping = artifact("export default function Loop(props) { return <Loop {...props} />; }");

    let mount = previewer.preview(&looping, &mut boundary);
    assert!(!mount.is_rendered());
    assert!(boundary.is_faulted());
    assert_eq!(events.borrow().errors.len(), 1);
}

#[test]
fn test_runaway_recursion_at_default_depth_is_contained() {
    let events = Rc::new(RefCell::new(Events::default()));
    let mut boundary = boundary(&events);
    let previewer = Previewer::new(Target::Html, LoaderConfig::default());

    let deep = artifact(
        "function depth(n) { return n === 0 ? 0 : 1 + depth(n - 1); }\n\
         export default () => <p>{depth(90)}</p>;",
    );
    assert_eq!(
        previewer.preview(&deep, &mut boundary),
        Mount::Rendered("<p>90</p>".to_string())
    );

    let looping = artifact("export default function Loop(props) { return <Loop {...props} />; }");
    let mount = previewer.preview(&looping, &mut boundary);
    assert!(
        mount.html().contains("RangeError: Maximum call stack size exceeded"),
        "{}",
        mount.html()
    );

    let unbounded = artifact(
        "function down(n) { return down(n + 1); }\n\
         export const start = down(0);\n\
         export default () => <p>never</p>;",
    );
    let mount = previewer.preview(&unbounded, &mut boundary);
    assert!(
        mount.html().contains("RangeError: Maximum call stack size exceeded"),
        "{}",
        mount.html()
    );
    assert_eq!(events.borrow().errors.len(), 2);
}

#[test]
fn test_oversized_allocations_are_contained() {
    let events = Rc::new(RefCell::new(Events::default()));
    let mut boundary = boundary(&events);
    let previewer = Previewer::new(Target::Html, LoaderConfig::default());

    let huge_array = artifact(
        "const rows = Array.from({ length: 1e12 });\n\
         export default () => <p>{rows.length}</p>;",
    );
    let mount = previewer.preview(&huge_array, &mut boundary);
    assert!(
        mount.html().contains("RangeError: Invalid array length"),
        "{}",
        mount.html()
    );

    let huge_string = artifact("export default () => <p>{'ab'.repeat(1e12)}</p>;");
    let mount = previewer.preview(&huge_string, &mut boundary);
    assert!(
        mount.html().contains("RangeError: Invalid string length"),
        "{}",
        mount.html()
    );

    let padded = artifact("export default () => <p>{'7'.padStart(1e12, '0')}</p>;");
    let mount = previewer.preview(&padded, &mut boundary);
    assert!(
        mount.html().contains("RangeError: Invalid string length"),
        "{}",
        mount.html()
    );

    // The previewer stays usable afterwards
    let fine = artifact("export default () => <p>{'ab'.repeat(2)}</p>;");
    assert_eq!(
        previewer.preview(&fine, &mut boundary),
        Mount::Rendered("<p>abab</p>".to_string())
    );
    assert_eq!(events.borrow().errors.len(), 3);
}

#[test]
fn test_keyed_preview_stays_faulted_until_key_changes() {
    let events = Rc::new(RefCell::new(Events::default()));
    let mut boundary = boundary(&events);
    let previewer = Previewer::new(Target::Html, LoaderConfig::default());

    let broken = artifact("export default () => { throw new Error(\"draft\"); };");
    let mount = previewer.preview_as(&broken, "message-1", &mut boundary);
    assert!(!mount.is_rendered());
    assert_eq!(boundary.identity(), Some("message-1"));

    // Same key: the fallback stays even though the files changed
    let fixed = artifact("export default () => <p>done</p>;");
    let mount = previewer.preview_as(&fixed, "message-1", &mut boundary);
    assert!(!mount.is_rendered());
    assert!(boundary.is_faulted());

    let mount = previewer.preview_as(&fixed, "message-2", &mut boundary);
    assert_eq!(mount, Mount::Rendered("<p>done</p>".to_string()));
    assert_eq!(events.borrow().errors, vec!["Error: draft".to_string()]);
    assert_eq!(events.borrow().successes, 1);
}
