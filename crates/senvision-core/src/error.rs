//! Error types for the SenVision cart

use std::fmt;

use thiserror::Error;

/// A required checkout field left blank by the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    Name,
    Phone,
    Address,
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CustomerField::Name => "name",
            CustomerField::Phone => "phone",
            CustomerField::Address => "address",
        };
        f.write_str(label)
    }
}

/// Main error type for cart operations
#[derive(Error, Debug)]
pub enum ShopError {
    /// Product id is not in the catalog
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product id could not be parsed
    #[error("Invalid product id: {0:?}")]
    InvalidProductId(String),

    /// Checkout or order preview requested on an empty cart
    #[error("Votre panier est vide. Ajoutez des produits avant de commander.")]
    EmptyCart,

    /// Checkout form is missing required fields
    #[error("Veuillez remplir tous les champs obligatoires (*)")]
    MissingFields(Vec<CustomerField>),

    /// Order submission collaborator refused the order
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Error during blob storage operations
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database creation/opening error
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table error
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage operation error
    #[error("Storage operation error: {0}")]
    StorageOp(#[from] redb::StorageError),

    /// Commit error
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// Error during serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        ShopError::Serialization(err.to_string())
    }
}

/// Result type alias using ShopError
pub type ShopResult<T> = Result<T, ShopError>;
