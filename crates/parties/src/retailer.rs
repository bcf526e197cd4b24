use serde::{Deserialize, Serialize};

use pikwa_core::{Alias, Entity, OrganizationCode, PurchasePrice, Revenue};

/// Retailer role. Managers may import product and promote other retailers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Seller,
    Manager,
}

/// A field retailer: unique alias, role, organization, running revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retailer {
    alias: Alias,
    name: String,
    role: Role,
    organization: Option<OrganizationCode>,
    cached_revenue: Revenue,
}

impl Retailer {
    pub fn new(alias: Alias, name: impl Into<String>) -> Self {
        Self {
            alias,
            name: name.into(),
            role: Role::Seller,
            organization: None,
            cached_revenue: Revenue::zero(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_organization(mut self, organization: OrganizationCode) -> Self {
        self.organization = Some(organization);
        self
    }

    pub fn alias(&self) -> &Alias {
        &self.alias
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn organization(&self) -> Option<&OrganizationCode> {
        self.organization.as_ref()
    }

    pub fn revenue(&self) -> Revenue {
        self.cached_revenue
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    pub fn promote_to_manager(&mut self) {
        self.role = Role::Manager;
    }

    /// Add one sale's worth of revenue to the cached total.
    pub fn accrue_revenue(&mut self, price: PurchasePrice) {
        self.cached_revenue = self.cached_revenue.accrue(price);
    }

    /// Undo one sale's worth of revenue (sale cancellation).
    pub fn reverse_revenue(&mut self, price: PurchasePrice) {
        self.cached_revenue = self.cached_revenue.reverse(price);
    }
}

impl Entity for Retailer {
    type Id = Alias;

    fn id(&self) -> &Self::Id {
        &self.alias
    }
}
