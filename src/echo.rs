use serde_json::{json, Value};

use crate::handler::{HandlerContext, Reply};

/// Echo back what the router extracted for the request.
///
/// Registered under every handler name by the `cgi` and `match` commands so a
/// manifest can be exercised without an application behind it.
pub fn echo_handler(ctx: &mut HandlerContext<'_>) -> anyhow::Result<Reply> {
    let options = ctx
        .options()
        .map(|o| Value::Object(o.extra.clone()))
        .unwrap_or(Value::Null);
    Ok(Reply::Json(json!({
        "method": ctx.method().as_str(),
        "path": ctx.path(),
        "params": ctx.params(),
        "options": options,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputBuffer;
    use http::Method;

    #[test]
    fn test_echo_reports_params() {
        let params = vec!["42".to_string()];
        let mut output = OutputBuffer::new();
        let mut ctx = HandlerContext::new(&Method::GET, "/users/42", &params, &mut output);
        match echo_handler(&mut ctx).unwrap() {
            Reply::Json(v) => {
                assert_eq!(v["method"], "GET");
                assert_eq!(v["params"][0], "42");
                assert!(v["options"].is_null());
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
