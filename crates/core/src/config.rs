use crate::error::CoreError;

/// Page size used when a query does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a query may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Query defaults loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefaults {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl QueryDefaults {
    /// Load defaults from the process environment.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `QUERY_DEFAULT_PAGE_SIZE` | `10`    |
    /// | `QUERY_MAX_PAGE_SIZE`     | `100`   |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load defaults through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_page_size =
            positive_var(&lookup, "QUERY_DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let max_page_size = positive_var(&lookup, "QUERY_MAX_PAGE_SIZE", MAX_PAGE_SIZE)?;

        if default_page_size > max_page_size {
            return Err(CoreError::Config(format!(
                "QUERY_DEFAULT_PAGE_SIZE ({default_page_size}) exceeds QUERY_MAX_PAGE_SIZE ({max_page_size})"
            )));
        }

        Ok(Self {
            default_page_size,
            max_page_size,
        })
    }
}

fn positive_var<F>(lookup: &F, key: &str, default: usize) -> Result<usize, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CoreError::Parse(format!(
            "{key} must be a positive integer, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_vars_use_defaults() {
        assert_eq!(
            QueryDefaults::from_lookup(lookup(&[])).unwrap(),
            QueryDefaults::default()
        );
    }

    #[test]
    fn vars_override_defaults() {
        let defaults = QueryDefaults::from_lookup(lookup(&[
            ("QUERY_DEFAULT_PAGE_SIZE", "25"),
            ("QUERY_MAX_PAGE_SIZE", " 50 "),
        ]))
        .unwrap();
        assert_eq!(defaults.default_page_size, 25);
        assert_eq!(defaults.max_page_size, 50);
    }

    #[test]
    fn zero_and_garbage_are_rejected() {
        assert_matches!(
            QueryDefaults::from_lookup(lookup(&[("QUERY_DEFAULT_PAGE_SIZE", "0")])),
            Err(CoreError::Parse(_))
        );
        assert_matches!(
            QueryDefaults::from_lookup(lookup(&[("QUERY_MAX_PAGE_SIZE", "lots")])),
            Err(CoreError::Parse(_))
        );
    }

    #[test]
    fn default_above_max_is_rejected() {
        assert_matches!(
            QueryDefaults::from_lookup(lookup(&[
                ("QUERY_DEFAULT_PAGE_SIZE", "40"),
                ("QUERY_MAX_PAGE_SIZE", "20"),
            ])),
            Err(CoreError::Config(_))
        );
    }
}
