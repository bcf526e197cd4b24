use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pikwa_catalog::Region;
use pikwa_core::{Alias, Entity, ProductCode, PurchasePrice, SerialNumber};

/// Buyer contact details captured at the point of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    pub first_name: String,
    pub last_name: String,
    pub primary_phone: String,
    pub secondary_phone: Option<String>,
}

impl Buyer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A validated request to record a sale, produced by the command parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub serial: SerialNumber,
    pub product: ProductCode,
    pub purchase_date: DateTime<Utc>,
    pub buyer: Buyer,
    pub price: PurchasePrice,
    pub region: Region,
    pub description: String,
    pub seller: Alias,
}

/// An immutable sale record. Serial number is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    serial: SerialNumber,
    product: ProductCode,
    purchase_date: DateTime<Utc>,
    buyer: Buyer,
    price: PurchasePrice,
    region: Region,
    description: String,
    seller: Alias,
}

impl Sale {
    pub(crate) fn from_request(request: SaleRequest) -> Self {
        Self {
            serial: request.serial,
            product: request.product,
            purchase_date: request.purchase_date,
            buyer: request.buyer,
            price: request.price,
            region: request.region,
            description: request.description,
            seller: request.seller,
        }
    }

    pub fn serial(&self) -> &SerialNumber {
        &self.serial
    }

    pub fn product(&self) -> &ProductCode {
        &self.product
    }

    pub fn purchase_date(&self) -> DateTime<Utc> {
        self.purchase_date
    }

    pub fn buyer(&self) -> &Buyer {
        &self.buyer
    }

    pub fn price(&self) -> PurchasePrice {
        self.price
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn seller(&self) -> &Alias {
        &self.seller
    }

    /// SMS status line: serial, amount paid, date, owner, location.
    pub fn status_line(&self) -> String {
        format!(
            "{}: {} Tsh paid on {}. Owner: {} ({}) {}, {}",
            self.serial,
            self.price.revenue_tsh(),
            self.purchase_date.format("%d-%m-%y"),
            self.buyer.full_name(),
            self.buyer.primary_phone,
            self.region.display_name(),
            self.description,
        )
    }
}

impl Entity for Sale {
    type Id = SerialNumber;

    fn id(&self) -> &Self::Id {
        &self.serial
    }
}
