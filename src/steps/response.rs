//! Step payloads
//!
//! The shapes steps hand back to the host engine for rendering or storage.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::host::ResumeUrls;

/// Instructional payload returned by the instruction steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResponse {
    /// Short heading; absent steps render description-only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Instructions shown to the operator, may span several lines
    pub description: String,
    /// Callback advancing the flow, forwarded verbatim from the host
    pub resume: String,
    /// Callback aborting the flow, forwarded verbatim from the host
    pub cancel: String,
}

impl StepResponse {
    pub fn new(title: Option<&str>, description: String, urls: ResumeUrls) -> Self {
        StepResponse {
            title: title.map(str::to_string),
            description,
            resume: urls.resume,
            cancel: urls.cancel,
        }
    }
}

/// Outcome status of a document extraction step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Data extracted
    Sucesso,
    /// The API answered but nothing usable was extracted
    Aviso,
    /// The step could not complete
    Erro,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Sucesso => "sucesso",
            OutcomeStatus::Aviso => "aviso",
            OutcomeStatus::Erro => "erro",
        }
    }
}

/// Payload returned by the extraction steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionOutcome {
    pub status: OutcomeStatus,
    pub mensagem: String,
    /// Always serialized, `null` when nothing was extracted
    pub dados: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagem_corrigida: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ExtractionOutcome {
    pub fn success(mensagem: &str, dados: Value) -> Self {
        ExtractionOutcome {
            status: OutcomeStatus::Sucesso,
            mensagem: mensagem.to_string(),
            dados: Some(dados),
            score: None,
            imagem_corrigida: None,
            metadata: None,
        }
    }

    pub fn warning(mensagem: &str) -> Self {
        ExtractionOutcome {
            status: OutcomeStatus::Aviso,
            mensagem: mensagem.to_string(),
            dados: None,
            score: None,
            imagem_corrigida: None,
            metadata: None,
        }
    }

    pub fn error(mensagem: &str) -> Self {
        ExtractionOutcome {
            status: OutcomeStatus::Erro,
            mensagem: mensagem.to_string(),
            dados: None,
            score: None,
            imagem_corrigida: None,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Approval form rendered by the host between steps
///
/// `actions` and `enums` are part of the host's form contract and always empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalForm {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_args: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enums: Option<Map<String, Value>>,
}

impl ApprovalForm {
    /// A bare form carrying only a title and description
    pub fn message(title: &str, description: &str) -> Self {
        ApprovalForm {
            title: title.to_string(),
            description: description.to_string(),
            fields: None,
            actions: None,
            default_args: None,
            outputs: None,
            enums: None,
        }
    }

    /// A full form with empty `fields`, `actions`, `default_args` and `enums`
    pub fn form(title: &str, description: &str) -> Self {
        ApprovalForm {
            fields: Some(Map::new()),
            actions: Some(Map::new()),
            default_args: Some(Map::new()),
            enums: Some(Map::new()),
            ..ApprovalForm::message(title, description)
        }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        self
    }

    pub fn with_default_arg(mut self, key: &str, value: Value) -> Self {
        self.default_args
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        self
    }

    pub fn with_output(mut self, key: &str, value: Value) -> Self {
        self.outputs
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        self
    }
}
