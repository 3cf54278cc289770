//! Read model and renderers for the cart views.
//!
//! Every view on the page (header badge, dropdown, offcanvas, order
//! summary) is a pure function of [`CartView`]. The renderers produce HTML
//! fragments; interactive controls carry `data-cart-action` attributes and
//! the host page binds the events.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use serde::Serialize;

use crate::cart::Cart;
use crate::types::{LineItem, ProductId};

/// Currency suffix used on every amount
pub const CURRENCY: &str = "FCFA";

/// fr-FR digit grouping separator (narrow no-break space)
const GROUP_SEPARATOR: char = '\u{202f}';

/// One rendered line of the cart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineView {
    pub id: ProductId,
    pub name: String,
    pub image_url: String,
    /// Per-unit price after discount
    pub unit_price: f64,
    pub quantity: u32,
    pub line_total: f64,
}

impl From<&LineItem> for LineView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            image_url: item.image_url.clone(),
            unit_price: item.effective_price(),
            quantity: item.quantity,
            line_total: item.line_total(),
        }
    }
}

/// Snapshot of everything the views need after a change
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CartView {
    /// Sum of quantities, not distinct products
    pub item_count: u64,
    pub total: f64,
    pub lines: Vec<LineView>,
}

impl CartView {
    pub fn from_items(items: &[LineItem]) -> Self {
        let lines: Vec<LineView> = items.iter().map(LineView::from).collect();
        Self {
            item_count: items.iter().map(|i| u64::from(i.quantity)).sum(),
            total: lines.iter().map(|l| l.line_total).sum(),
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Round to the nearest whole FCFA and group digits the fr-FR way
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0 { "-" } else { "" };
    format!("{}{} {}", sign, grouped, CURRENCY)
}

/// Header badge text
pub fn render_badge(view: &CartView) -> String {
    view.item_count.to_string()
}

/// `"3 article(s)"`
pub fn count_label(view: &CartView) -> String {
    format!("{} article(s)", view.item_count)
}

/// Compact dropdown listing under the header cart icon
pub fn render_dropdown(view: &CartView) -> String {
    if view.is_empty() {
        return concat!(
            r#"<div class="text-center p-3">"#,
            r#"<i class="bi bi-cart text-muted mb-2"></i>"#,
            r#"<p class="text-muted mb-0">Votre panier est vide</p>"#,
            "</div>"
        )
        .to_string();
    }

    view.lines
        .iter()
        .map(|line| {
            let id = line.id.to_string();
            format!(
                concat!(
                    r#"<div class="cart-dropdown-item">"#,
                    r#"<img src="{image}" alt="{alt}" class="cart-item-image">"#,
                    r#"<h6 class="mb-1 cart-item-name">{name}</h6>"#,
                    r#"<button class="btn btn-sm btn-link text-danger p-0" data-cart-action="remove" data-product-id="{id}"><i class="bi bi-x"></i></button>"#,
                    r#"<small class="text-muted">{unit} x {qty}</small>"#,
                    r#"<small class="fw-bold">{total}</small>"#,
                    "</div>"
                ),
                image = attr(&line.image_url),
                alt = attr(&line.name),
                name = text(&line.name),
                id = attr(&id),
                unit = format_amount(line.unit_price),
                qty = line.quantity,
                total = format_amount(line.line_total),
            )
        })
        .collect()
}

/// Offcanvas panel: item list plus the two amount labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffcanvasFragment {
    pub items_html: String,
    pub subtotal: String,
    pub total: String,
}

/// Side panel with quantity controls
pub fn render_offcanvas(view: &CartView) -> OffcanvasFragment {
    if view.is_empty() {
        let items_html = concat!(
            r#"<div class="text-center py-5">"#,
            r#"<i class="bi bi-cart display-4 text-muted mb-3"></i>"#,
            r#"<p class="text-muted">Votre panier est vide</p>"#,
            r#"<a href="marques.html" class="btn btn-primary mt-3">Découvrir nos produits</a>"#,
            "</div>"
        )
        .to_string();
        return OffcanvasFragment {
            items_html,
            subtotal: format_amount(0.0),
            total: format_amount(0.0),
        };
    }

    let html: String = view
        .lines
        .iter()
        .map(|line| {
            let id = line.id.to_string();
            let disabled = if line.quantity <= 1 { " disabled" } else { "" };
            format!(
                concat!(
                    r#"<div class="cart-item-offcanvas mb-3 p-3 border rounded">"#,
                    r#"<img src="{image}" alt="{alt}" class="cart-offcanvas-image me-3">"#,
                    r#"<h6 class="mb-1">{name}</h6>"#,
                    r#"<div class="btn-group btn-group-sm">"#,
                    r#"<button class="btn btn-outline-secondary" data-cart-action="set-quantity" data-product-id="{id}" data-quantity="{dec}"{disabled}><i class="bi bi-dash"></i></button>"#,
                    r#"<span class="btn btn-outline-secondary disabled quantity-display">{qty}</span>"#,
                    r#"<button class="btn btn-outline-secondary" data-cart-action="set-quantity" data-product-id="{id}" data-quantity="{inc}"><i class="bi bi-plus"></i></button>"#,
                    "</div>",
                    r#"<div class="text-end"><div class="fw-bold">{total}</div><small class="text-muted">{unit} l'unité</small></div>"#,
                    r#"<button class="btn btn-sm btn-outline-danger w-100 mt-2" data-cart-action="remove" data-product-id="{id}"><i class="bi bi-trash me-1"></i> Retirer</button>"#,
                    "</div>"
                ),
                image = attr(&line.image_url),
                alt = attr(&line.name),
                name = text(&line.name),
                id = attr(&id),
                dec = i64::from(line.quantity) - 1,
                inc = i64::from(line.quantity) + 1,
                disabled = disabled,
                qty = line.quantity,
                total = format_amount(line.line_total),
                unit = format_amount(line.unit_price),
            )
        })
        .collect();

    let subtotal = format_amount(view.total);
    OffcanvasFragment {
        items_html: html,
        total: subtotal.clone(),
        subtotal,
    }
}

/// Order confirmation modal body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummaryFragment {
    pub items_html: String,
    pub total: String,
}

pub fn render_order_summary(view: &CartView) -> OrderSummaryFragment {
    let html: String = view
        .lines
        .iter()
        .map(|line| {
            format!(
                concat!(
                    r#"<div class="d-flex justify-content-between border-bottom pb-2 mb-2">"#,
                    "<div><small>{name} x{qty}</small></div>",
                    "<div><small>{total}</small></div>",
                    "</div>"
                ),
                name = text(&line.name),
                qty = line.quantity,
                total = format_amount(line.line_total),
            )
        })
        .collect();
    OrderSummaryFragment {
        items_html: html,
        total: format_amount(view.total),
    }
}

/// Every cart view rendered from one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCart {
    pub badge: String,
    pub count_label: String,
    pub total: String,
    pub dropdown_html: String,
    pub offcanvas: OffcanvasFragment,
    pub order_summary: OrderSummaryFragment,
}

pub fn render_view(view: &CartView) -> RenderedCart {
    RenderedCart {
        badge: render_badge(view),
        count_label: count_label(view),
        total: format_amount(view.total),
        dropdown_html: render_dropdown(view),
        offcanvas: render_offcanvas(view),
        order_summary: render_order_summary(view),
    }
}

/// Render straight from any cart implementation
pub fn render_all<C: Cart + ?Sized>(cart: &C) -> RenderedCart {
    render_view(&cart.view())
}
