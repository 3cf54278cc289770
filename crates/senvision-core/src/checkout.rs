//! Checkout form, order summary and order submission.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{CustomerField, ShopError, ShopResult};
use crate::schedule::TaskId;
use crate::types::{LineItem, ProductId};
use crate::view::format_amount;

/// The checkout form's bound input fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub notes: String,
}

impl CheckoutForm {
    /// Check the required fields and extract the customer.
    ///
    /// Name, phone and address must contain something other than
    /// whitespace. Email and notes are optional.
    pub fn validate(&self) -> ShopResult<CustomerDetails> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(CustomerField::Name);
        }
        if self.phone.trim().is_empty() {
            missing.push(CustomerField::Phone);
        }
        if self.address.trim().is_empty() {
            missing.push(CustomerField::Address);
        }
        if !missing.is_empty() {
            return Err(ShopError::MissingFields(missing));
        }

        Ok(CustomerDetails {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            email: non_blank(&self.email),
            notes: non_blank(&self.notes),
        })
    }

    /// Empty every field
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Validated customer contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// One product line of a placed order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Everything the order sink receives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub customer: CustomerDetails,
    pub lines: Vec<OrderLine>,
    pub total: f64,
    pub placed_at: DateTime<Local>,
}

impl OrderSummary {
    pub fn build(items: &[LineItem], customer: CustomerDetails, placed_at: DateTime<Local>) -> Self {
        let lines: Vec<OrderLine> = items
            .iter()
            .map(|item| OrderLine {
                id: item.id.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.effective_price(),
                subtotal: item.line_total(),
            })
            .collect();
        let total = lines.iter().map(|l| l.subtotal).sum();

        Self {
            customer,
            lines,
            total,
            placed_at,
        }
    }

    /// Bullet list of `name xqty: amount`, one line per product
    pub fn details(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                format!(
                    "• {} x{}: {}\n",
                    line.name,
                    line.quantity,
                    format_amount(line.subtotal)
                )
            })
            .collect()
    }

    /// Message shown to the customer once the confirmation is due
    pub fn confirmation_message(&self) -> String {
        let total = format_amount(self.total);
        format!(
            "🎉 Commande confirmée !\n\
             \n\
             Merci {name} !\n\
             \n\
             Votre commande de {total} a été enregistrée.\n\
             \n\
             Récapitulatif:\n\
             {details}\
             Total: {total}\n\
             \n\
             Nous vous contacterons au {phone} dans les plus brefs délais pour confirmer la livraison à:\n\
             {address}\n\
             \n\
             À bientôt chez SenVision !\n",
            name = self.customer.name,
            total = total,
            details = self.details(),
            phone = self.customer.phone,
            address = self.customer.address,
        )
    }

    /// Plain-text order as handed to the shop
    pub fn message(&self) -> String {
        let customer = &self.customer;
        format!(
            "NOUVELLE COMMANDE SenVision\n\
             ============================\n\
             Client: {}\n\
             Téléphone: {}\n\
             Email: {}\n\
             Adresse: {}\n\
             \n\
             DÉTAILS DE LA COMMANDE:\n\
             {}\
             -------------------------\n\
             TOTAL: {}\n\
             \n\
             Notes: {}\n\
             \n\
             Date: {}\n",
            customer.name,
            customer.phone,
            customer.email.as_deref().unwrap_or("Non fourni"),
            customer.address,
            self.details(),
            format_amount(self.total),
            customer.notes.as_deref().unwrap_or("Aucune"),
            self.placed_at.format("%d/%m/%Y %H:%M:%S"),
        )
    }
}

/// A checkout that went through
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    pub summary: OrderSummary,
    /// Pending display of the confirmation message
    pub confirmation: TaskId,
}

/// Where placed orders go
pub trait OrderSink {
    fn submit(&self, order: &OrderSummary) -> ShopResult<()>;
}

/// Records the order in the log and accepts it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOrderSink;

impl OrderSink for LogOrderSink {
    fn submit(&self, order: &OrderSummary) -> ShopResult<()> {
        tracing::info!(
            customer = %order.customer.name,
            lines = order.lines.len(),
            total = order.total,
            "order received\n{}",
            order.message()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use chrono::TimeZone;

    fn filled_form() -> CheckoutForm {
        CheckoutForm {
            name: "Awa Diop".to_string(),
            phone: "77 123 45 67".to_string(),
            email: String::new(),
            address: "Rue 10, Dakar".to_string(),
            notes: "  ".to_string(),
        }
    }

    fn sample_order() -> OrderSummary {
        let mut rb = LineItem::from_product(&Product::new(1, "Ray-Ban", 1000).with_promotion(20));
        rb.quantity = 3;
        let oakley = LineItem::from_product(&Product::new(2, "Oakley", 12_500));
        let customer = filled_form().validate().unwrap();
        let placed_at = Local.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        OrderSummary::build(&[rb, oakley], customer, placed_at)
    }

    #[test]
    fn test_validate_accepts_required_fields() {
        let customer = filled_form().validate().unwrap();
        assert_eq!(customer.name, "Awa Diop");
        assert_eq!(customer.email, None);
        assert_eq!(customer.notes, None);
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let form = CheckoutForm {
            name: "Awa".to_string(),
            phone: "   ".to_string(),
            ..CheckoutForm::default()
        };
        match form.validate() {
            Err(ShopError::MissingFields(fields)) => {
                assert_eq!(fields, vec![CustomerField::Phone, CustomerField::Address]);
            }
            other => panic!("expected missing fields, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_clears_fields() {
        let mut form = filled_form();
        form.reset();
        assert_eq!(form, CheckoutForm::default());
    }

    #[test]
    fn test_summary_computes_subtotals() {
        let order = sample_order();
        assert_eq!(order.lines.len(), 2);
        assert!((order.lines[0].subtotal - 2400.0).abs() < 1e-9);
        assert!((order.total - 14_900.0).abs() < 1e-9);
    }

    #[test]
    fn test_order_message_layout() {
        let message = sample_order().message();
        assert!(message.starts_with("NOUVELLE COMMANDE SenVision\n"));
        assert!(message.contains("Client: Awa Diop\n"));
        assert!(message.contains("Email: Non fourni\n"));
        assert!(message.contains("• Ray-Ban x3: 2\u{202f}400 FCFA\n"));
        assert!(message.contains("• Oakley x1: 12\u{202f}500 FCFA\n"));
        assert!(message.contains("TOTAL: 14\u{202f}900 FCFA\n"));
        assert!(message.contains("Notes: Aucune\n"));
        assert!(message.contains("Date: 14/03/2026 15:09:26"));
    }

    #[test]
    fn test_confirmation_message_recaps_order() {
        let message = sample_order().confirmation_message();
        assert!(message.starts_with("🎉 Commande confirmée !\n"));
        assert!(message.contains("Merci Awa Diop !"));
        assert!(message.contains("Votre commande de 14\u{202f}900 FCFA a été enregistrée."));
        assert!(message.contains("Nous vous contacterons au 77 123 45 67"));
        assert!(message.contains("Rue 10, Dakar\n"));
    }

    #[test]
    fn test_log_sink_accepts_orders() {
        assert!(LogOrderSink.submit(&sample_order()).is_ok());
    }
}
