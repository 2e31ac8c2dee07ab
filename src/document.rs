use crate::backend::{SearchHit, StoredDocument, WriteResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A book as written to and read from the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One validation failure, located by its path in the request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    pub fn missing(loc: &[&str]) -> Self {
        Self::new(loc, "Field required", "missing")
    }
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: None,
            tags: Vec::new(),
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Validate a request body, collecting every field error
    pub fn from_request(body: &Value) -> Result<Self, Vec<FieldError>> {
        let Some(object) = body.as_object() else {
            return Err(vec![FieldError::new(
                &["body"],
                "Input should be a valid dictionary",
                "dict_type",
            )]);
        };

        let mut errors = Vec::new();
        let title = required_string(object, "title", &mut errors);
        let author = required_string(object, "author", &mut errors);
        let year = optional_integer(object, "year", &mut errors);
        let tags = string_list(object, "tags", &mut errors);

        match (title, author) {
            (Some(title), Some(author)) if errors.is_empty() => Ok(Self {
                title,
                author,
                year,
                tags,
            }),
            _ => Err(errors),
        }
    }

    /// Body stored in the engine: every field present, `year` may be null
    pub fn to_source(&self) -> Value {
        let mut source = Map::new();
        source.insert("title".to_string(), Value::from(self.title.clone()));
        source.insert("author".to_string(), Value::from(self.author.clone()));
        source.insert(
            "year".to_string(),
            self.year.map(Value::from).unwrap_or(Value::Null),
        );
        source.insert("tags".to_string(), Value::from(self.tags.clone()));
        Value::Object(source)
    }
}

fn required_string(object: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match object.get(field) {
        None => {
            errors.push(FieldError::missing(&["body", field]));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(
                &["body", field],
                "Input should be a valid string",
                "string_type",
            ));
            None
        }
    }
}

fn optional_integer(object: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<i32> {
    let invalid = |errors: &mut Vec<FieldError>| {
        errors.push(FieldError::new(
            &["body", field],
            "Input should be a valid integer",
            "int_parsing",
        ));
        None
    };

    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => match n.as_i64().and_then(|v| i32::try_from(v).ok()) {
            Some(v) => Some(v),
            None => invalid(errors),
        },
        Some(Value::String(s)) => match s.trim().parse::<i32>() {
            Ok(v) => Some(v),
            Err(_) => invalid(errors),
        },
        Some(_) => invalid(errors),
    }
}

fn string_list(object: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Vec<String> {
    let items = match object.get(field) {
        None => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.push(FieldError::new(
                &["body", field],
                "Input should be a valid list",
                "list_type",
            ));
            return Vec::new();
        }
    };

    let mut tags = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::String(s) => tags.push(s.clone()),
            _ => errors.push(FieldError::new(
                &["body", field, i.to_string().as_str()],
                "Input should be a valid string",
                "string_type",
            )),
        }
    }
    tags
}

/// Response to a write: the engine's outcome and the document id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertResponse {
    pub result: WriteResult,
    #[serde(rename = "_id")]
    pub id: String,
}

/// Health response: engine reachable, with its cluster name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub cluster: Option<String>,
}

/// A stored book plus its identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDocument {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub tags: Vec<String>,
    #[serde(rename = "_id")]
    pub id: String,
}

impl TryFrom<StoredDocument> for BookDocument {
    type Error = serde_json::Error;

    fn try_from(doc: StoredDocument) -> Result<Self, Self::Error> {
        let book: Book = serde_json::from_value(doc.source)?;
        Ok(Self {
            title: book.title,
            author: book.author,
            year: book.year,
            tags: book.tags,
            id: doc.id,
        })
    }
}

/// A search match: stored book, identifier and relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookHit {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub tags: Vec<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: Option<f64>,
}

impl TryFrom<SearchHit> for BookHit {
    type Error = serde_json::Error;

    fn try_from(hit: SearchHit) -> Result<Self, Self::Error> {
        let book: Book = serde_json::from_value(hit.source)?;
        Ok(Self {
            title: book.title,
            author: book.author,
            year: book.year,
            tags: book.tags,
            id: hit.id,
            score: hit.score,
        })
    }
}
