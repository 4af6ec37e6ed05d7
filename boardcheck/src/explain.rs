//! Contract types for the external explanation/suggestion collaborator.
//!
//! The engine never talks to that service itself; it only defines the
//! request/response shapes and the provider seam so GUI and CLI layers can
//! plug in whatever text generator they use. No implementation ships here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::BoardCheckError;
use crate::schema::{Board, ComponentKind, Issue};

/// Ask the collaborator to explain a finding in plain language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainRequest {
    /// The issue message (or free text typed by the user).
    pub message: String,
    /// The full issue, when the question is about one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<Issue>,
    /// Board snapshot for context, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub explanation: String,
    /// Step-by-step fix instructions, when the collaborator offers them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
}

/// What aspect of the design a suggestion is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Placement,
    Routing,
    Component,
    General,
}

/// A concrete action the UI can apply on the user's behalf. The wire shape is
/// `{"type": ..., "params": {...}}`, with the payload typed per action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum SuggestionAction {
    AddNet {
        name: String,
    },
    AddComponent {
        #[serde(rename = "type")]
        kind: ComponentKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    MoveComponent {
        component_id: String,
        x: f64,
        y: f64,
    },
}

/// A design-improvement suggestion from the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlSuggestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<SuggestionAction>,
    #[serde(rename = "relatedIds", default)]
    pub related_ids: Vec<String>,
}

/// The provider seam. Implementations live outside the engine (HTTP clients,
/// local models, canned test doubles).
#[async_trait]
pub trait ExplainProvider: Send + Sync {
    async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse, BoardCheckError>;

    async fn suggest(&self, board: &Board) -> Result<Vec<MlSuggestion>, BoardCheckError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedProvider;

    #[async_trait]
    impl ExplainProvider for CannedProvider {
        async fn explain(
            &self,
            request: &ExplainRequest,
        ) -> Result<ExplainResponse, BoardCheckError> {
            Ok(ExplainResponse {
                explanation: format!("About: {}", request.message),
                steps: Some(vec!["Fix it".to_string()]),
            })
        }

        async fn suggest(&self, _board: &Board) -> Result<Vec<MlSuggestion>, BoardCheckError> {
            Ok(vec![MlSuggestion {
                id: "suggest_ground_net".to_string(),
                kind: SuggestionKind::Component,
                message: "Add a ground net (GND)".to_string(),
                action: Some(SuggestionAction::AddNet { name: "GND".to_string() }),
                related_ids: vec![],
            }])
        }
    }

    #[tokio::test]
    async fn test_provider_contract() {
        let provider = CannedProvider;
        let response = provider
            .explain(&ExplainRequest {
                message: "Net 'N1' connects only 1 component(s)".to_string(),
                issue: None,
                board: None,
            })
            .await
            .unwrap();
        assert!(response.explanation.contains("N1"));

        let suggestions = provider.suggest(&Board::default()).await.unwrap();
        assert_eq!(suggestions.len(), 1);
    }

    #[test]
    fn test_action_wire_shape() {
        let action = SuggestionAction::AddComponent {
            kind: ComponentKind::Resistor,
            value: Some("220".to_string()),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "add_component",
                "params": {"type": "resistor", "value": "220"}
            })
        );

        let parsed: SuggestionAction =
            serde_json::from_value(serde_json::json!({
                "type": "add_net",
                "params": {"name": "VCC"}
            }))
            .unwrap();
        assert_eq!(parsed, SuggestionAction::AddNet { name: "VCC".to_string() });
    }

    #[test]
    fn test_suggestion_roundtrip() {
        let suggestion = MlSuggestion {
            id: "s1".to_string(),
            kind: SuggestionKind::Placement,
            message: "Group related components".to_string(),
            action: None,
            related_ids: vec!["R1".to_string()],
        };
        let json = serde_json::to_string(&suggestion).unwrap();
        let back: MlSuggestion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, suggestion);
    }
}
