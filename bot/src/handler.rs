use log::{debug, warn};
use machine_learning::{MlErr, Predictor};

use crate::parser::parse_kv_message;

const PREDICTION_FAILED: &str = "Sorry, the prediction failed. Please try again later.";

/// Turns incoming chat messages into replies using a loaded model.
///
/// Shared between message tasks behind an `Arc`, it holds nothing mutable.
#[derive(Debug)]
pub struct Handler {
    predictor: Predictor,
}

impl Handler {
    pub fn new(predictor: Predictor) -> Self {
        Self { predictor }
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    /// Builds the reply to a message, `None` if the message should be left unanswered.
    ///
    /// `/start` and `/schema` (optionally addressed as `/schema@botname`) are answered, any
    /// other command is ignored and plain text is taken as a prediction request.
    pub fn respond(&self, text: &str) -> Option<String> {
        let text = text.trim();
        let Some(command) = text.strip_prefix('/') else {
            return Some(self.handle_text(text));
        };

        let name = command
            .split_whitespace()
            .next()
            .and_then(|c| c.split('@').next())
            .unwrap_or_default();

        match name {
            "start" => Some(self.start()),
            "schema" => Some(self.schema()),
            _ => {
                debug!("ignoring command /{name}");
                None
            }
        }
    }

    pub fn start(&self) -> String {
        "Hi! Send your data as key=value pairs separated by spaces. \
         The /schema command shows the expected features."
            .to_string()
    }

    /// Lists the features the model needs and the targets it predicts.
    pub fn schema(&self) -> String {
        format!(
            "Send every feature:\n{}\n\nPrediction targets:\n{}",
            self.predictor.features().join(", "),
            self.predictor.targets().join(", ")
        )
    }

    /// Parses a `key=value` message and predicts every target from it.
    pub fn handle_text(&self, text: &str) -> String {
        let record = parse_kv_message(text);

        let missing = self.predictor.missing_features(&record);
        if !missing.is_empty() {
            return format!("Missing features: {}", missing.join(", "));
        }

        match self.predictor.predict(&record) {
            Ok(prediction) => {
                let mut reply = String::from("Prediction:");
                for (target, value) in prediction.iter() {
                    reply.push_str(&format!("\n{target} = {value:.2}"));
                }
                reply
            }
            Err(e) => error_reply(&e),
        }
    }
}

/// Schema errors are shown to the user as is, anything else only goes to the log.
fn error_reply(e: &MlErr) -> String {
    if e.is_schema_error() {
        return e.to_string();
    }

    warn!("prediction failed: {e}");
    PREDICTION_FAILED.to_string()
}
