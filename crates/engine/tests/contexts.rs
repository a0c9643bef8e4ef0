use ctxlog_engine::{
    all_contexts_in_file, context_at_cursor, ContextAnalyzer, ContextKind, EngineError, Language,
    LogConfig, Position, ANONYMOUS,
};
use pretty_assertions::assert_eq;

fn unfiltered() -> LogConfig {
    LogConfig {
        filter_unused_variables: false,
        ..LogConfig::default()
    }
}

fn names(source: &str, config: &LogConfig) -> Vec<String> {
    all_contexts_in_file(source, config)
        .unwrap()
        .iter()
        .map(|ctx| ctx.name.clone())
        .collect()
}

#[test]
fn sources_without_scopes_yield_nothing() {
    let config = LogConfig::default();
    let source = "const a = 1;\nlet b = a + 2;\nexport default b;\n";
    assert!(all_contexts_in_file(source, &config).unwrap().is_empty());
    for line in 0..4 {
        for column in [0, 3, 40] {
            let found = context_at_cursor(source, Position::new(line, column), &config).unwrap();
            assert!(found.is_none(), "unexpected match at {line}:{column}");
        }
    }
}

#[test]
fn simple_function_with_args_and_locals() {
    let contexts = all_contexts_in_file("function myFunction(a,b) { const c = 1; }", &unfiltered())
        .unwrap();
    assert_eq!(contexts.len(), 1);
    let ctx = &contexts[0];
    assert_eq!(ctx.name, "myFunction");
    assert_eq!(ctx.kind, ContextKind::Function);
    assert_eq!(ctx.args, vec!["a", "b"]);
    assert_eq!(ctx.variables.locals, vec!["c"]);
}

#[test]
fn component_args_become_props() {
    let contexts = all_contexts_in_file(
        "function MyComponent(props) { return <div>Hello</div>; }",
        &unfiltered(),
    )
    .unwrap();
    let ctx = &contexts[0];
    assert_eq!(ctx.kind, ContextKind::Component);
    assert_eq!(ctx.args, vec!["props"]);
    assert_eq!(ctx.variables.props, vec!["props"]);
}

#[test]
fn unused_props_are_filtered_by_default() {
    let source = "function MyComponent(props) {\n  return <div>Hello</div>;\n}";
    let contexts = all_contexts_in_file(source, &LogConfig::default()).unwrap();
    assert!(contexts[0].variables.props.is_empty());
    assert_eq!(contexts[0].args, vec!["props"]);

    let source = "function MyComponent(props) {\n  return <div>{props.title}</div>;\n}";
    let contexts = all_contexts_in_file(source, &LogConfig::default()).unwrap();
    assert_eq!(contexts[0].variables.props, vec!["props"]);
}

#[test]
fn use_state_keeps_value_slot() {
    let source = "function MyComponent(){ const [count,setCount] = useState(0); console.log(count); }";
    for config in [LogConfig::default(), unfiltered()] {
        let contexts = all_contexts_in_file(source, &config).unwrap();
        let vars = &contexts[0].variables;
        assert_eq!(vars.state, vec!["count"]);
        assert!(!vars.state.contains(&"setCount".to_string()));
        assert!(!vars.locals.contains(&"setCount".to_string()));
    }
}

#[test]
fn hooks_fill_their_buckets() {
    let source = r#"
function Profile({ id }) {
  const [user, setUser] = useState(null);
  const inputRef = useRef(null);
  const theme = useContext(ThemeContext);
  const [todos, dispatch] = useReducer(reducer, []);
  const session = useSelector(selectSession);
  const label = `#${id}`;
  return <input ref={inputRef} className={theme} value={label + user + todos + session} />;
}
"#;
    let config = LogConfig::react();
    let contexts = all_contexts_in_file(source, &config).unwrap();
    let vars = &contexts[0].variables;
    assert_eq!(vars.props, vec!["id"]);
    assert_eq!(vars.state, vec!["user"]);
    assert_eq!(vars.refs, vec!["inputRef"]);
    assert_eq!(vars.context, vec!["theme"]);
    assert_eq!(vars.reducers, vec!["todos"]);
    assert_eq!(vars.redux_context, vec!["session"]);
    assert_eq!(vars.locals, vec!["label"]);
}

#[test]
fn locals_in_declaration_order() {
    let source = "function myFunction() {\n  const a = 1;\n  let b = 'hello';\n console.log(a,b) \n}";
    let contexts = all_contexts_in_file(source, &LogConfig::default()).unwrap();
    assert_eq!(contexts[0].variables.locals, vec!["a", "b"]);
}

#[test]
fn unused_locals_are_dropped() {
    let source = "function f() {\n  const used = 1;\n  const unused = 2;\n  return used;\n}";
    let contexts = all_contexts_in_file(source, &LogConfig::default()).unwrap();
    assert_eq!(contexts[0].variables.locals, vec!["used"]);
}

#[test]
fn sensitive_names_are_dropped_from_args() {
    let config = LogConfig {
        sensitive_keys: vec!["password".into(), "token".into()],
        ..unfiltered()
    };
    let contexts = all_contexts_in_file("function f(password, token, username){}", &config).unwrap();
    assert_eq!(contexts[0].args, vec!["username"]);
}

#[test]
fn destructured_and_default_args_are_flattened() {
    let source = "function f({ a, b: { c } }, [d, , e], f = 1, ...rest) {}";
    let contexts = all_contexts_in_file(source, &unfiltered()).unwrap();
    assert_eq!(contexts[0].args, vec!["a", "c", "d", "e", "f", "rest"]);
}

#[test]
fn function_flavours_are_scopes() {
    let source = "async function load() {}\nfunction* ids() {}\nconst arrow = async () => {};\nexport default function () {}";
    assert_eq!(
        names(source, &unfiltered()),
        vec!["load", "ids", "arrow", ANONYMOUS]
    );
    assert_eq!(names("function func1() {}\nfunction func2() {}", &unfiltered()).len(), 2);
}

#[test]
fn class_methods_follow_the_flag() {
    let source = "class MyClass {\n  myMethod() {\n    const a = 1;\n  }\n}";
    assert!(names(source, &unfiltered()).is_empty());

    let config = LogConfig {
        enable_class_method_logging: true,
        ..unfiltered()
    };
    assert_eq!(names(source, &config), vec!["myMethod"]);
}

#[test]
fn nested_functions_link_to_parent() {
    let contexts =
        all_contexts_in_file("function outer(){ function inner(){} }", &unfiltered()).unwrap();
    assert_eq!(contexts.len(), 2);
    assert_eq!(contexts[0].name, "outer");
    assert_eq!(contexts[1].name, "inner");
    let parent = contexts.parent(&contexts[1]).unwrap();
    assert_eq!(parent.name, "outer");
}

#[test]
fn cursor_match_exposes_parent_chain() {
    let source = r#"function App() {
  const items = [];
  const render = () => {
    return items.map((item) => {
      return item.id;
    });
  };
  return render();
}"#;
    let found = context_at_cursor(source, Position::new(4, 6), &unfiltered())
        .unwrap()
        .unwrap();
    assert_eq!(found.context().name, ANONYMOUS);
    let chain: Vec<&str> = found.ancestors().map(|ctx| ctx.name.as_str()).collect();
    assert_eq!(chain, vec!["render", "App"]);
}

#[test]
fn insert_position_never_precedes_scope_start() {
    let source = r#"
const A = () => <span />;
function B(x) {
  if (x) {
    return 1;
  }
  const y = x * 2;
}
const c = function () { return () => {}; };
class D { m() { return this.props; } }
"#;
    let config = LogConfig::react();
    let contexts = all_contexts_in_file(source, &config).unwrap();
    assert_eq!(contexts.len(), 5);
    for ctx in &contexts {
        assert!(ctx.insert_position.line >= ctx.span.start.line, "{}", ctx.name);
        if let Some(parent) = ctx.parent {
            assert!(parent < ctx.id);
        }
    }
    assert_eq!(contexts[0].kind, ContextKind::Component);
    // the nested `return 1` is not a top-level return
    assert_eq!(contexts[1].insert_position, Position::new(7, 0));
}

#[test]
fn repeated_queries_are_identical() {
    let source = "function Card({ title }) {\n  const [open, setOpen] = useState(false);\n  return <h1 onClick={() => setOpen(!open)}>{title}</h1>;\n}";
    let config = LogConfig::default();
    let first = all_contexts_in_file(source, &config).unwrap();
    let second = all_contexts_in_file(source, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn malformed_source_is_a_parse_error() {
    let err = all_contexts_in_file("function broken( {", &LogConfig::default()).unwrap_err();
    match err {
        EngineError::Parse { line, .. } => assert_eq!(line, 1),
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn typescript_parameters_are_unwrapped() {
    let mut analyzer = ContextAnalyzer::new(unfiltered(), Language::TypeScript).unwrap();
    let contexts = analyzer
        .all_contexts_in_file(
            "export function total(items: Item[], tax?: number, { round = true }: Opts = {}): number {\n  const sum = items.length;\n  return sum;\n}",
        )
        .unwrap();
    assert_eq!(contexts[0].args, vec!["items", "tax", "round"]);
    assert_eq!(contexts[0].variables.locals, vec!["sum"]);
}
