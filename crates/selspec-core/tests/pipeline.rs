//! End-to-end tests: build, prepare, populate, enrich, group.

mod common;

use common::{GO_VERSION, HTTP, WEB, WEB_VERSION};
use selspec_core::{
    BasicQualifier, Config, Engine, Error, ErrorCategory, FlowBlock, FlowSpec, FuncQualifier,
    Kind, ParamMatch, PositionSplit, Selector, SharedSpec, Spec, StructQualifier, TypeQualifier,
};

fn engine() -> Engine {
    Engine::with_builtins(Config::default()).expect("engine")
}

fn web(id: &str) -> BasicQualifier {
    BasicQualifier::new(WEB, WEB_VERSION, id)
}

#[test]
fn test_redirect_scenario() {
    let engine = engine();
    let mut spec = Spec::new("web framework");
    let model = spec
        .push_model(engine.registry(), "redirects", Kind::Redirect)
        .unwrap();
    model
        .method_mut("GetUrl")
        .unwrap()
        .push_selector(FuncQualifier::with_positions(web("Redirect"), vec![true]));

    engine.process(&mut spec, &common::load).unwrap();

    let method = spec.models[0].method("GetUrl").unwrap();
    let groups = engine.group_func_selectors(method).unwrap();
    assert_eq!(groups.package_keys(), vec!["example.com/web@v1.4.2"]);

    let entries = &groups.funcs["example.com/web@v1.4.2"];
    assert_eq!(entries.len(), 1);
    assert!(groups.type_methods.is_empty());
    assert!(groups.interface_methods.is_empty());

    let split = entries[0].positions().unwrap().unwrap();
    assert_eq!(
        split,
        PositionSplit {
            receiver: false,
            params: vec![0],
            results: vec![],
        }
    );
}

#[test]
fn test_variadic_scenario() {
    let engine = engine();
    let mut spec = Spec::new("Web");
    let model = spec
        .push_model(engine.registry(), "Sources", Kind::UntrustedFlowSource)
        .unwrap();
    model.methods[0].push_selector(FuncQualifier::with_positions(
        web("Join"),
        vec![false, true, false],
    ));
    engine.process(&mut spec, &common::load).unwrap();

    let groups = engine.group_func_selectors(&spec.models[0].methods[0]).unwrap();
    let entry = &groups.funcs["example.com/web@v1.4.2"][0];
    let split = entry.positions().unwrap().unwrap();
    assert_eq!(split.params, vec![1]);

    let matches = split.param_matches(entry.func.variadic, entry.func.params.len());
    assert_eq!(matches, vec![ParamMatch::AtLeast(1)]);
    assert!(matches[0].matches(3));
}

#[test]
fn test_standard_library_key_has_no_version() {
    let engine = engine();
    let mut spec = Spec::new("Web");
    let model = spec
        .push_model(engine.registry(), "Redirects", Kind::Redirect)
        .unwrap();
    model.methods[0].push_selector(FuncQualifier::with_positions(
        BasicQualifier::new(HTTP, GO_VERSION, "Redirect"),
        vec![false, false, true, false],
    ));
    model.methods[1].push_selector(FuncQualifier::with_positions(
        BasicQualifier::new(HTTP, GO_VERSION, "Redirect"),
        vec![true, false, false, false],
    ));
    engine.process(&mut spec, &common::load).unwrap();

    for method in &spec.models[0].methods {
        let groups = engine.group_func_selectors(method).unwrap();
        assert_eq!(groups.package_keys(), vec!["net/http"]);
    }
}

#[test]
fn test_header_write_groups_methods_by_receiver() {
    let engine = engine();
    let mut spec = Spec::new("Web");
    let model = spec
        .push_model(engine.registry(), "Headers", Kind::HeaderWrite)
        .unwrap();
    // receiver, key, value
    model
        .method_mut("GetName")
        .unwrap()
        .push_selector(FuncQualifier::with_positions(
            web("Context.SetHeader"),
            vec![false, true, false],
        ));
    model
        .method_mut("GetValue")
        .unwrap()
        .push_selector(FuncQualifier::with_positions(
            web("Context.SetHeader"),
            vec![false, false, true],
        ));
    model
        .method_mut("GetResponseWriter")
        .unwrap()
        .push_selector(FuncQualifier::with_positions(
            web("Context.SetHeader"),
            vec![true, false, false],
        ));
    engine.process(&mut spec, &common::load).unwrap();

    let model = spec.model("Headers").unwrap();
    let writer = engine
        .group_func_selectors(model.method("GetResponseWriter").unwrap())
        .unwrap();
    let entries = &writer.type_methods["example.com/web@v1.4.2"]["Context"];
    assert_eq!(entries.len(), 1);
    assert!(entries[0].positions().unwrap().unwrap().receiver);
    assert!(writer.funcs.is_empty());

    let Selector::Func(q) = &model.method("GetValue").unwrap().selectors[0] else {
        panic!("expected a func selector");
    };
    let elements = q.elements.as_ref().unwrap();
    assert_eq!(elements.params[1].name, "value");
    assert_eq!(elements.params[1].absolute, 2);
}

#[test]
fn test_taint_tracking_flows() {
    let engine = engine();
    let mut spec = Spec::new("Web");
    let model = spec
        .push_model(engine.registry(), "Steps", Kind::TaintTracking)
        .unwrap();
    // Render: data (param 1) flows into w (param 0)
    model.methods[0].push_selector(FuncQualifier::with_flows(
        web("Renderer.Render"),
        FlowSpec {
            blocks: vec![FlowBlock::new(
                vec![false, false, true, false],
                vec![false, true, false, false],
            )],
            enabled: true,
        },
    ));
    engine.process(&mut spec, &common::load).unwrap();

    let groups = engine.group_func_selectors(&spec.models[0].methods[0]).unwrap();
    let entry = &groups.interface_methods["example.com/web@v1.4.2"]["Renderer"][0];
    assert!(entry.positions().unwrap().is_none());

    let blocks = entry.flow_blocks().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].0.params, vec![1]);
    assert_eq!(blocks[0].1.params, vec![0]);
}

#[test]
fn test_struct_and_type_grouping() {
    let engine = engine();
    let mut spec = Spec::new("Web");
    let model = spec
        .push_model(engine.registry(), "Sources", Kind::UntrustedFlowSource)
        .unwrap();
    let method = &mut model.methods[0];
    method.push_selector(StructQualifier::new(web("Request")).select("Body"));
    method.push_selector(StructQualifier::new(web("Request")));
    method.push_selector(TypeQualifier::new(web("Request"), false));
    engine.process(&mut spec, &common::load).unwrap();

    // Only the struct selector with a field survives pruning
    let method = &spec.models[0].methods[0];
    assert_eq!(method.selectors.len(), 1);

    let structs = engine.group_struct_selectors(method).unwrap();
    let entry = &structs["example.com/web@v1.4.2"][0];
    assert_eq!(entry.qualifier.total, 2);
    assert_eq!(entry.qualifier.left, 1);
    assert_eq!(entry.qualifier.fields["Body"].type_string, "[]byte");
    // The cache dropped the field's doc comment
    assert_eq!(entry.meta.field("Body").unwrap().doc, None);

    assert!(engine.group_type_selectors(method).unwrap().is_empty());
}

#[test]
fn test_unloaded_module_is_a_reference_error() {
    let engine = engine();
    let mut spec = Spec::new("Web");
    let model = spec
        .push_model(engine.registry(), "Redirects", Kind::Redirect)
        .unwrap();
    model.methods[0].push_selector(FuncQualifier::with_positions(
        BasicQualifier::new("unknown.org/mod", "v0.1.0", "Go"),
        vec![true],
    ));

    let err = engine.process(&mut spec, &common::load).unwrap_err();
    assert!(matches!(err, Error::Loader { .. }));
    assert_eq!(err.category(), ErrorCategory::Reference);

    // Grouping without loading is fatal too
    let err = engine
        .group_func_selectors(&spec.models[0].methods[0])
        .unwrap_err();
    assert!(matches!(err, Error::SourceNotFound { .. }));
}

#[test]
fn test_persisted_form_round_trip() {
    let engine = engine();
    let mut spec = Spec::new("Web");
    let model = spec
        .push_model(engine.registry(), "Sources", Kind::UntrustedFlowSource)
        .unwrap();
    let method = &mut model.methods[0];
    method.push_selector(FuncQualifier::with_positions(
        web("Context.Query"),
        vec![false, false, true],
    ));
    method.push_selector(StructQualifier::new(web("Request")).select("Path"));
    engine.prepare(&mut spec).unwrap();
    let authoritative = spec.clone();

    engine.populate(&spec, &common::load).unwrap();
    engine.add_meta(&mut spec).unwrap();
    engine.remove_meta(&mut spec);
    assert_eq!(spec, authoritative);

    let json = spec.to_json().unwrap();
    let back = Spec::from_json(&json).unwrap();
    assert_eq!(back, authoritative);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spec.json");
    std::fs::write(&path, &json).unwrap();
    assert_eq!(Spec::load(&path).unwrap(), authoritative);
}

#[test]
fn test_shared_spec_concurrent_readers() {
    let engine = engine();
    let shared = SharedSpec::new(Spec::new("Web"));
    shared
        .push_model(engine.registry(), "Redirects", Kind::Redirect)
        .unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let shared = shared.clone();
            scope.spawn(move || {
                let spec = shared.read();
                assert_eq!(spec.models.len(), 1);
            });
        }
    });

    let err = shared
        .push_model(engine.registry(), "redirects", Kind::Redirect)
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Structural);
}
