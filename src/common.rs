use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde_json::Value;

/// Template registry for prompts. Output is plain text, so HTML escaping is off.
pub fn get_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(no_escape);

    handlebars_helper!(join: |items: Value, sep: String| {
        items
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string).or_else(|| (!v.is_null()).then(|| v.to_string())))
                    .collect::<Vec<_>>()
                    .join(&sep)
            })
            .unwrap_or_default()
    });
    handlebars.register_helper("join", Box::new(join));

    handlebars_helper!(nonempty: |v: Value| match &v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    });
    handlebars.register_helper("nonempty", Box::new(nonempty));

    handlebars
}
