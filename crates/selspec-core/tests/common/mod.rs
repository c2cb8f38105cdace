//! Common test utilities.

#![allow(dead_code)]

use selspec_meta::{
    Field, Func, InterfaceMethod, PackageMeta, Param, Receiver, SourceSpan, Struct, TypeMethod,
};

pub const WEB: &str = "example.com/web";
pub const WEB_VERSION: &str = "v1.4.2";
pub const HTTP: &str = "net/http";
pub const GO_VERSION: &str = "go1.21.0";

fn func(id: &str, name: &str, pkg_path: &str, params: Vec<Param>, results: Vec<Param>) -> Func {
    Func {
        id: id.into(),
        name: name.into(),
        pkg_path: pkg_path.into(),
        params,
        results,
        variadic: false,
        doc: Some(format!("{name} does something.")),
        span: Some(SourceSpan {
            file: "web.go".into(),
            line: 1,
        }),
    }
}

fn receiver(type_id: &str, kind: &str) -> Receiver {
    Receiver {
        name: "c".into(),
        type_id: type_id.into(),
        type_string: format!("*{type_id}"),
        kind: kind.into(),
    }
}

/// A small web framework package
pub fn web_package() -> PackageMeta {
    let mut pkg = PackageMeta::new(WEB, WEB_VERSION);

    // func Redirect(url string)
    pkg.funcs.push(func(
        "Redirect",
        "Redirect",
        WEB,
        vec![Param::new("url", "string", "basic")],
        vec![],
    ));

    // func Join(sep string, parts ...string) string
    let mut join = func(
        "Join",
        "Join",
        WEB,
        vec![
            Param::new("sep", "string", "basic"),
            Param::new("parts", "[]string", "slice"),
        ],
        vec![Param::new("", "string", "basic")],
    );
    join.variadic = true;
    pkg.funcs.push(join);

    // func (c *Context) SetHeader(key, value string)
    pkg.type_methods.push(TypeMethod {
        id: "Context.SetHeader".into(),
        receiver: receiver("Context", "pointer"),
        func: func(
            "Context.SetHeader",
            "SetHeader",
            WEB,
            vec![
                Param::new("key", "string", "basic"),
                Param::new("value", "string", "basic"),
            ],
            vec![],
        ),
    });

    // func (c *Context) Query(name string) string
    pkg.type_methods.push(TypeMethod {
        id: "Context.Query".into(),
        receiver: receiver("Context", "pointer"),
        func: func(
            "Context.Query",
            "Query",
            WEB,
            vec![Param::new("name", "string", "basic")],
            vec![Param::new("", "string", "basic")],
        ),
    });

    // Renderer interface: Render(w io.Writer, data any) error
    pkg.interface_methods.push(InterfaceMethod {
        id: "Renderer.Render".into(),
        receiver: receiver("Renderer", "interface"),
        func: func(
            "Renderer.Render",
            "Render",
            WEB,
            vec![
                Param::new("w", "io.Writer", "interface"),
                Param::new("data", "any", "interface"),
            ],
            vec![Param::new("", "error", "interface")],
        ),
    });

    pkg.structs.push(Struct {
        id: "Request".into(),
        name: "Request".into(),
        type_string: "Request".into(),
        fields: vec![
            Field {
                name: "Path".into(),
                type_string: "string".into(),
                kind: "basic".into(),
                doc: None,
            },
            Field {
                name: "Body".into(),
                type_string: "[]byte".into(),
                kind: "slice".into(),
                doc: Some("Raw body.".into()),
            },
        ],
        doc: None,
        span: None,
    });

    pkg
}

/// The bits of net/http the tests use
pub fn http_package() -> PackageMeta {
    let mut pkg = PackageMeta::new(HTTP, GO_VERSION);
    // func Redirect(w ResponseWriter, r *Request, url string, code int)
    pkg.funcs.push(func(
        "Redirect",
        "Redirect",
        HTTP,
        vec![
            Param::new("w", "ResponseWriter", "interface"),
            Param::new("r", "*Request", "pointer"),
            Param::new("url", "string", "basic"),
            Param::new("code", "int", "basic"),
        ],
        vec![],
    ));
    pkg
}

/// Loader serving the two fixture packages
pub fn load(path: &str, version: &str) -> eyre::Result<PackageMeta> {
    match (path, version) {
        (WEB, WEB_VERSION) => Ok(web_package()),
        (HTTP, GO_VERSION) => Ok(http_package()),
        _ => eyre::bail!("unknown module {path}@{version}"),
    }
}
