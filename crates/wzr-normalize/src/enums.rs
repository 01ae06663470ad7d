use serde_json::Value;
use wzr_schema::{EnumMapping, FieldSpec, Warning};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    ToUi,
    ToBackend,
}

/// Resolve `token` to one side of the table.
///
/// Lookup order: exact match on the target side (already normalized), exact
/// match on the opposite side, then ASCII-case-insensitive match on either.
fn resolve<'m>(map: &'m EnumMapping, token: &str, dir: Direction) -> Option<&'m str> {
    // (target side, opposite side)
    let oriented = move |(u, b): (&'m str, &'m str)| match dir {
        Direction::ToUi => (u, b),
        Direction::ToBackend => (b, u),
    };

    map.pairs()
        .map(oriented)
        .find(|(target, _)| *target == token)
        .or_else(|| map.pairs().map(oriented).find(|(_, opposite)| *opposite == token))
        .or_else(|| {
            map.pairs().map(oriented).find(|(target, opposite)| {
                target.eq_ignore_ascii_case(token) || opposite.eq_ignore_ascii_case(token)
            })
        })
        .map(|(target, _)| target)
}

fn map_tokens(
    v: &Value,
    map: &EnumMapping,
    dir: Direction,
    path: &str,
    warnings: &mut Vec<Warning>,
) -> Value {
    match v {
        Value::Null => Value::Null,
        Value::String(s) if s.is_empty() => v.clone(),
        Value::String(s) => match resolve(map, s, dir) {
            Some(t) => Value::String(t.to_string()),
            None => {
                warnings.push(Warning::unknown_enum(path, s.as_str()));
                v.clone()
            }
        },
        // Multi-select: map element-wise.
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| map_tokens(item, map, dir, path, warnings))
                .collect(),
        ),
        other => {
            warnings.push(Warning::unknown_enum(path, other.to_string()));
            other.clone()
        }
    }
}

/// Backend -> UI token casing for one value of `field`. Fields without an
/// enum table are returned unchanged.
pub fn value_to_ui(v: &Value, field: &FieldSpec, path: &str, warnings: &mut Vec<Warning>) -> Value {
    match &field.enum_map {
        Some(map) => map_tokens(v, map, Direction::ToUi, path, warnings),
        None => v.clone(),
    }
}

/// UI -> backend token casing for one value of `field`. Fields without an
/// enum table are returned unchanged.
pub fn to_backend(v: &Value, field: &FieldSpec, path: &str, warnings: &mut Vec<Warning>) -> Value {
    match &field.enum_map {
        Some(map) => map_tokens(v, map, Direction::ToBackend, path, warnings),
        None => v.clone(),
    }
}
