/// Type definitions of a low-level SQL string representation.
#[derive(Debug, Clone, PartialEq)]
pub struct SQL {
    pub sql: String,
    pub params: Vec<Param>,
    /// for internal use and tests only
    pub param_index: u64,
}

impl Default for SQL {
    fn default() -> Self {
        Self::new()
    }
}

/// A parameter for a parameterized query.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// A literal written in the query text.
    Value(serde_json::Value),
    /// A parameter name to look up in the caller's bindings.
    Variable(String),
}

impl SQL {
    pub fn new() -> SQL {
        SQL {
            sql: String::new(),
            params: vec![],
            param_index: 0,
        }
    }

    pub fn append_syntax(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append a double-quoted identifier. Embedded quotes are doubled.
    pub fn append_identifier(&mut self, sql: &str) {
        self.sql.push('"');
        self.sql.push_str(&sql.replace('"', "\"\""));
        self.sql.push('"');
    }

    pub fn append_param(&mut self, param: Param) {
        self.param_index += 1;
        self.sql.push_str(format!("${}", self.param_index).as_str());
        self.params.push(param);
    }

    /// The SQL text formatted for humans.
    pub fn pretty(&self) -> String {
        sqlformat::format(
            &self.sql,
            &sqlformat::QueryParams::None,
            sqlformat::FormatOptions::default(),
        )
    }
}
