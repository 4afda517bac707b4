//! Ingredient scanning from photos
//!
//! Sends a photo of a receipt or delivery note to the model and reads back
//! the ingredients it lists. Any failure yields an empty list.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::error::{CostbookError, CostbookResult};

use super::client::{ChatMessage, GenerativeClient};

const SCAN_PROMPT: &str = "You read photos of receipts, invoices and delivery notes for a food business. \
List every ingredient or supply item you can see. \
Reply with JSON only, shaped as {\"ingredients\":[{\"name\":string,\"quantity\":number|null,\"unit\":string|null}]}. \
If you cannot read any items, reply with {\"ingredients\":[]}.";

/// One ingredient read from a photo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannedIngredient {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

/// MIME type for an image path, from its extension
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

/// Encode image bytes as a `data:` URL
pub fn image_data_url(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Strip a surrounding markdown code fence, if any
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().trim_end_matches("```").trim()
}

fn read_quantity(value: Option<&Value>) -> Option<f64> {
    let quantity: Option<f64> = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    };
    quantity.filter(|q| q.is_finite() && *q >= 0.0)
}

fn read_ingredient(value: &Value) -> Option<ScannedIngredient> {
    let name = match value {
        Value::String(s) => s.trim(),
        Value::Object(obj) => obj.get("name")?.as_str()?.trim(),
        _ => return None,
    };
    if name.is_empty() {
        return None;
    }

    Some(ScannedIngredient {
        name: name.to_string(),
        quantity: read_quantity(value.get("quantity")),
        unit: value
            .get("unit")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
    })
}

/// Parse the model's reply. Accepts `{"ingredients": [...]}` or a bare
/// array, optionally wrapped in a code fence; entries without a name are
/// skipped.
pub fn parse_ingredients(raw: &str) -> CostbookResult<Vec<ScannedIngredient>> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| CostbookError::Assistant(format!("Scanner reply is not JSON: {}", e)))?;

    let items = match &value {
        Value::Array(items) => items,
        Value::Object(obj) => obj
            .get("ingredients")
            .and_then(Value::as_array)
            .ok_or_else(|| CostbookError::Assistant("Scanner reply has no ingredients list".into()))?,
        _ => {
            return Err(CostbookError::Assistant(
                "Scanner reply has an unexpected shape".into(),
            ))
        }
    };

    Ok(items.iter().filter_map(read_ingredient).collect())
}

/// Reads ingredient lists from photos
pub struct IngredientScanner {
    client: GenerativeClient,
}

impl IngredientScanner {
    pub fn new(client: GenerativeClient) -> Self {
        Self { client }
    }

    /// Scan an image file. Unreadable files and failed requests give an
    /// empty list.
    pub async fn scan_file(&self, path: &Path) -> Vec<ScannedIngredient> {
        match tokio::fs::read(path).await {
            Ok(bytes) => self.scan_bytes(&bytes, mime_type_for(path)).await,
            Err(e) => {
                error!(path = %path.display(), error = %e, "could not read image");
                Vec::new()
            }
        }
    }

    pub async fn scan_bytes(&self, bytes: &[u8], mime_type: &str) -> Vec<ScannedIngredient> {
        match self.try_scan(bytes, mime_type).await {
            Ok(ingredients) => {
                info!(count = ingredients.len(), "scanned ingredients");
                ingredients
            }
            Err(e) => {
                error!(error = %e, "ingredient scan failed");
                Vec::new()
            }
        }
    }

    async fn try_scan(&self, bytes: &[u8], mime_type: &str) -> CostbookResult<Vec<ScannedIngredient>> {
        if bytes.is_empty() {
            return Err(CostbookError::Validation("Image is empty".into()));
        }

        let messages = [
            ChatMessage::system(SCAN_PROMPT),
            ChatMessage::user_with_image(
                "List the ingredients in this photo.",
                image_data_url(bytes, mime_type),
            ),
        ];

        let reply = self.client.complete(&messages, true).await?;
        parse_ingredients(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::client::test_server::{reply_body, serve_once};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_parse_object_and_fenced_replies() {
        let plain = r#"{"ingredients":[{"name":"Flour","quantity":25,"unit":"kg"},{"name":"Eggs","quantity":"30"}]}"#;
        let items = parse_ingredients(plain).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Flour");
        assert_eq!(items[0].quantity, Some(25.0));
        assert_eq!(items[0].unit.as_deref(), Some("kg"));
        assert_eq!(items[1].quantity, Some(30.0));
        assert!(items[1].unit.is_none());

        let fenced = "```json\n{\"ingredients\":[{\"name\":\"Butter\"}]}\n```";
        assert_eq!(parse_ingredients(fenced).unwrap()[0].name, "Butter");
    }

    #[test]
    fn test_parse_bare_array_and_skips_nameless() {
        let raw = r#"["Sugar", {"name": "  "}, {"quantity": 2}, {"name": "Milk", "quantity": -1}]"#;
        let items = parse_ingredients(raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Sugar");
        assert_eq!(items[1].name, "Milk");
        assert!(items[1].quantity.is_none());
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_ingredients("I see flour and eggs").is_err());
        assert!(parse_ingredients(r#"{"items": []}"#).is_err());
    }

    #[test]
    fn test_mime_types_and_data_url() {
        assert_eq!(mime_type_for(&PathBuf::from("r.PNG")), "image/png");
        assert_eq!(mime_type_for(&PathBuf::from("r.jpeg")), "image/jpeg");
        assert_eq!(mime_type_for(&PathBuf::from("receipt")), "image/jpeg");
        assert_eq!(image_data_url(b"hi", "image/png"), "data:image/png;base64,aGk=");
    }

    #[tokio::test]
    async fn test_missing_file_gives_empty_list() {
        let client = GenerativeClient::new("http://127.0.0.1:9/none", "test-model", Some("k".into()));
        let scanner = IngredientScanner::new(client);
        let items = scanner.scan_file(Path::new("/definitely/not/here.jpg")).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_gives_empty_list() {
        let client = GenerativeClient::new("http://127.0.0.1:9/none", "test-model", None);
        let scanner = IngredientScanner::new(client);
        assert!(scanner.scan_bytes(b"\x89PNG", "image/png").await.is_empty());
    }

    #[tokio::test]
    async fn test_scan_file_sends_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("receipt.png");
        std::fs::write(&path, b"fake-png").unwrap();

        let (url, handle) = serve_once(
            200,
            reply_body(r#"{"ingredients":[{"name":"Yeast","quantity":0.5,"unit":"kg"}]}"#),
        )
        .await;
        let scanner = IngredientScanner::new(GenerativeClient::new(url, "test-model", Some("k".into())));

        let items = scanner.scan_file(&path).await;
        assert_eq!(
            items,
            vec![ScannedIngredient {
                name: "Yeast".into(),
                quantity: Some(0.5),
                unit: Some("kg".into()),
            }]
        );

        let request = handle.await.unwrap();
        assert!(request.contains(&image_data_url(b"fake-png", "image/png")));
    }
}
