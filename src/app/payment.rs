use crate::config::toml_config::PaymentConfig;
use crate::core::pricing::round_to;
use crate::domain::model::{PaymentInstruction, PaymentRequest, PaymentStatus};
use crate::utils::error::{QuoteError, Result};

/// Static pay-by-handle instructions. Nothing here can observe an actual
/// transfer, so a rider's confirmation is only ever recorded as a claim.
#[derive(Debug, Clone)]
pub struct PaymentDesk {
    payee_handle: String,
    qr_image_url: String,
}

impl PaymentDesk {
    pub fn new(payee_handle: impl Into<String>, qr_image_url: impl Into<String>) -> Self {
        Self {
            payee_handle: payee_handle.into(),
            qr_image_url: qr_image_url.into(),
        }
    }

    pub fn from_config(config: &PaymentConfig) -> Self {
        Self::new(config.payee_handle.clone(), config.qr_image_url.clone())
    }

    pub fn payee_handle(&self) -> &str {
        &self.payee_handle
    }

    pub fn instruction(&self, request: &PaymentRequest) -> PaymentInstruction {
        PaymentInstruction {
            amount: round_to(request.total_fare, 2),
            payee_handle: self.payee_handle.clone(),
            qr_image_url: self.qr_image_url.clone(),
            summary: request.trip_summary.clone(),
        }
    }

    /// The rider pressed "I've sent payment".
    pub fn record_claim(&self, instruction: &PaymentInstruction) -> PaymentStatus {
        tracing::warn!(
            "Rider claims payment of ${:.2} to {}; not verified",
            instruction.amount,
            instruction.payee_handle
        );
        PaymentStatus::ClaimedByRider
    }

    /// Only an external payment reference can mark a booking as paid.
    pub fn record_verified(&self, reference: &str) -> Result<PaymentStatus> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(QuoteError::ValidationError {
                message: "payment reference cannot be empty".to_string(),
            });
        }

        tracing::info!("Payment verified with reference {}", reference);
        Ok(PaymentStatus::Verified {
            reference: reference.to_string(),
        })
    }
}

impl Default for PaymentDesk {
    fn default() -> Self {
        Self::from_config(&PaymentConfig::default())
    }
}
