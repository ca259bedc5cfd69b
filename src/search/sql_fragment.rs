//! SQL Fragment
//!
//! Parameterized SQL with identifier and value parameters kept in separate
//! channels. Templates use printf-style placeholders:
//!
//! ```text
//! %i   identifier (table / column)   → `name`
//! %d   integer value                 → 42
//! %s   string value                  → 'text'
//! %%   literal percent sign
//! ```
//!
//! A fragment is either rendered inline for the host to splice into its own
//! query ([`SqlFragment::render`]) or split into a `?`-placeholder statement
//! plus bind values for a driver ([`SqlFragment::to_bindable`]).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FragmentError {
    #[error("placeholder %{placeholder} at byte {position} has no parameter")]
    MissingParam { placeholder: char, position: usize },
    #[error("placeholder %{placeholder} at byte {position} got a {found} parameter")]
    ChannelMismatch {
        placeholder: char,
        position: usize,
        found: &'static str,
    },
    #[error("{count} parameter(s) left unused")]
    UnusedParams { count: usize },
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// Table or column name, quoted as an identifier
    Identifier(String),
    /// Integer value
    Int(i64),
    /// String value
    Text(String),
}

impl SqlParam {
    fn kind(&self) -> &'static str {
        match self {
            SqlParam::Identifier(_) => "identifier",
            SqlParam::Int(_) => "integer",
            SqlParam::Text(_) => "text",
        }
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, SqlParam::Identifier(_))
    }
}

/// Value handed to a driver's `bind()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
}

/// SQL template plus its ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFragment {
    /// Template with `%i` / `%d` / `%s` placeholders
    pub clause: String,
    /// Parameters in placeholder order
    pub params: Vec<SqlParam>,
}

enum Mode {
    Inline,
    Bindable,
}

impl SqlFragment {
    pub fn new(clause: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            clause: clause.into(),
            params,
        }
    }

    /// Predicate that matches no rows.
    pub fn contradiction() -> Self {
        Self::new("1=0", Vec::new())
    }

    pub fn is_contradiction(&self) -> bool {
        self.clause == "1=0" && self.params.is_empty()
    }

    pub fn identifier_params(&self) -> impl Iterator<Item = &str> {
        self.params.iter().filter_map(|p| match p {
            SqlParam::Identifier(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn value_params(&self) -> impl Iterator<Item = &SqlParam> {
        self.params.iter().filter(|p| !p.is_identifier())
    }

    /// Substitute every parameter, producing SQL ready to embed.
    ///
    /// String values are escaped for MySQL string literals in the default SQL
    /// mode: `'` is doubled and `\` becomes `\\`. Under `NO_BACKSLASH_ESCAPES`
    /// or on SQLite a backslash in a value renders as two. Executing against
    /// other dialects goes through [`SqlFragment::to_bindable`], which never
    /// inlines values.
    pub fn render(&self) -> Result<String, FragmentError> {
        let mut values = Vec::new();
        self.substitute(Mode::Inline, &mut values)
    }

    /// Inline identifiers, turn value placeholders into `?`.
    pub fn to_bindable(&self) -> Result<(String, Vec<SqlValue>), FragmentError> {
        let mut values = Vec::new();
        let sql = self.substitute(Mode::Bindable, &mut values)?;
        Ok((sql, values))
    }

    fn substitute(&self, mode: Mode, values: &mut Vec<SqlValue>) -> Result<String, FragmentError> {
        let mut out = String::with_capacity(self.clause.len() + self.params.len() * 8);
        let mut params = self.params.iter();
        let mut chars = self.clause.char_indices().peekable();

        while let Some((position, c)) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            let placeholder = match chars.peek() {
                Some(&(_, p @ ('i' | 'd' | 's' | '%'))) => p,
                _ => {
                    out.push('%');
                    continue;
                }
            };
            chars.next();
            if placeholder == '%' {
                out.push('%');
                continue;
            }

            let param = params
                .next()
                .ok_or(FragmentError::MissingParam { placeholder, position })?;

            match (placeholder, param, &mode) {
                ('i', SqlParam::Identifier(name), _) => out.push_str(&quote_identifier(name)),
                ('d', SqlParam::Int(n), Mode::Inline) => out.push_str(&n.to_string()),
                ('s', SqlParam::Text(s), Mode::Inline) => out.push_str(&quote_string(s)),
                ('d', SqlParam::Int(n), Mode::Bindable) => {
                    values.push(SqlValue::Int(*n));
                    out.push('?');
                }
                ('s', SqlParam::Text(s), Mode::Bindable) => {
                    values.push(SqlValue::Text(s.clone()));
                    out.push('?');
                }
                _ => {
                    return Err(FragmentError::ChannelMismatch {
                        placeholder,
                        position,
                        found: param.kind(),
                    })
                }
            }
        }

        let leftover = params.count();
        if leftover > 0 {
            return Err(FragmentError::UnusedParams { count: leftover });
        }
        Ok(out)
    }
}

/// `n` comma-separated copies of `placeholder`, for IN-lists.
pub fn placeholder_list(placeholder: &str, n: usize) -> String {
    vec![placeholder; n].join(",")
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_all_channels() {
        let fragment = SqlFragment::new(
            "SELECT %i FROM %i WHERE name = %s AND id IN (%d,%d)",
            vec![
                SqlParam::Identifier("ID".into()),
                SqlParam::Identifier("wp_posts".into()),
                SqlParam::Text("shop_order".into()),
                SqlParam::Int(3),
                SqlParam::Int(7),
            ],
        );
        assert_eq!(
            fragment.render().unwrap(),
            "SELECT `ID` FROM `wp_posts` WHERE name = 'shop_order' AND id IN (3,7)"
        );
    }

    #[test]
    fn test_bindable_keeps_identifiers_inline() {
        let fragment = SqlFragment::new(
            "SELECT 1 FROM %i WHERE k = %s AND v IN (%d)",
            vec![
                SqlParam::Identifier("wp_postmeta".into()),
                SqlParam::Text("_sku".into()),
                SqlParam::Int(42),
            ],
        );
        let (sql, values) = fragment.to_bindable().unwrap();
        assert_eq!(sql, "SELECT 1 FROM `wp_postmeta` WHERE k = ? AND v IN (?)");
        assert_eq!(values, vec![SqlValue::Text("_sku".into()), SqlValue::Int(42)]);
    }

    #[test]
    fn test_identifier_injection_is_quoted() {
        let fragment = SqlFragment::new(
            "SELECT * FROM %i",
            vec![SqlParam::Identifier("posts`; DROP TABLE x; --".into())],
        );
        assert_eq!(
            fragment.render().unwrap(),
            "SELECT * FROM `posts``; DROP TABLE x; --`"
        );
    }

    #[test]
    fn test_string_escaping() {
        let fragment = SqlFragment::new("v = %s", vec![SqlParam::Text(r"it's \' odd".into())]);
        assert_eq!(fragment.render().unwrap(), r"v = 'it''s \\'' odd'");
    }

    #[test]
    fn test_literal_percent() {
        let fragment = SqlFragment::new("a LIKE 'x%%' AND b = %d", vec![SqlParam::Int(1)]);
        assert_eq!(fragment.render().unwrap(), "a LIKE 'x%' AND b = 1");

        let loose = SqlFragment::new("50%off", Vec::new());
        assert_eq!(loose.render().unwrap(), "50%off");
    }

    #[test]
    fn test_missing_param() {
        let fragment = SqlFragment::new("a = %d AND b = %d", vec![SqlParam::Int(1)]);
        assert_eq!(
            fragment.render(),
            Err(FragmentError::MissingParam { placeholder: 'd', position: 15 })
        );
    }

    #[test]
    fn test_channel_mismatch() {
        let fragment = SqlFragment::new("FROM %i", vec![SqlParam::Text("posts".into())]);
        assert!(matches!(
            fragment.render(),
            Err(FragmentError::ChannelMismatch { placeholder: 'i', found: "text", .. })
        ));

        let fragment = SqlFragment::new("id = %d", vec![SqlParam::Identifier("ID".into())]);
        assert!(matches!(
            fragment.to_bindable(),
            Err(FragmentError::ChannelMismatch { placeholder: 'd', found: "identifier", .. })
        ));
    }

    #[test]
    fn test_unused_params() {
        let fragment = SqlFragment::new("1=1", vec![SqlParam::Int(1), SqlParam::Int(2)]);
        assert_eq!(fragment.render(), Err(FragmentError::UnusedParams { count: 2 }));
    }

    #[test]
    fn test_contradiction() {
        let fragment = SqlFragment::contradiction();
        assert!(fragment.is_contradiction());
        assert_eq!(fragment.render().unwrap(), "1=0");
    }

    #[test]
    fn test_placeholder_list() {
        assert_eq!(placeholder_list("%d", 3), "%d,%d,%d");
        assert_eq!(placeholder_list("%s", 1), "%s");
        assert_eq!(placeholder_list("%d", 0), "");
    }

    #[test]
    fn test_backslash_escaping_is_mysql_default_mode() {
        let fragment = SqlFragment::new("v = %s", vec![SqlParam::Text(r"a\'b".into())]);
        assert_eq!(fragment.render().unwrap(), r"v = 'a\\''b'");

        // The bindable path hands the driver the value untouched
        let (sql, values) = fragment.to_bindable().unwrap();
        assert_eq!(sql, "v = ?");
        assert_eq!(values, vec![SqlValue::Text(r"a\'b".into())]);
    }
}
