//! User types, account states and the user-creation affordance matrix.

use serde::{Deserialize, Serialize};

/// Kind of back-office account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    SuperAdmin,
    Admin,
    Manager,
    Accountant,
    WarehouseManager,
    WarehouseAgent,
    CustomerService,
    DeliveryAgent,
    PickupAgent,
    Seller,
}

impl UserType {
    pub const ALL: [UserType; 10] = [
        UserType::SuperAdmin,
        UserType::Admin,
        UserType::Manager,
        UserType::Accountant,
        UserType::WarehouseManager,
        UserType::WarehouseAgent,
        UserType::CustomerService,
        UserType::DeliveryAgent,
        UserType::PickupAgent,
        UserType::Seller,
    ];

    pub fn access_level(self) -> AccessLevel {
        match self {
            UserType::SuperAdmin => AccessLevel::Platform,
            UserType::Admin => AccessLevel::Administrator,
            UserType::Manager => AccessLevel::Supervisor,
            UserType::WarehouseManager | UserType::Accountant => AccessLevel::Supervisor,
            UserType::WarehouseAgent | UserType::CustomerService => AccessLevel::Operator,
            UserType::DeliveryAgent | UserType::PickupAgent | UserType::Seller => {
                AccessLevel::Basic
            }
        }
    }

    /// User types an actor of this type may create from the back office.
    pub fn creatable_user_types(self) -> &'static [UserType] {
        use UserType::*;
        match self {
            SuperAdmin => &Self::ALL,
            Admin => &[
                Admin,
                Manager,
                Accountant,
                WarehouseManager,
                WarehouseAgent,
                CustomerService,
                DeliveryAgent,
                PickupAgent,
                Seller,
            ],
            Manager => &[
                Accountant,
                WarehouseManager,
                WarehouseAgent,
                CustomerService,
                DeliveryAgent,
                PickupAgent,
                Seller,
            ],
            WarehouseManager => &[WarehouseAgent, DeliveryAgent, PickupAgent],
            CustomerService => &[Seller],
            Accountant | WarehouseAgent | DeliveryAgent | PickupAgent | Seller => &[],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UserType::SuperAdmin => "Super administrateur",
            UserType::Admin => "Administrateur",
            UserType::Manager => "Manager",
            UserType::Accountant => "Comptable",
            UserType::WarehouseManager => "Chef d'entrepôt",
            UserType::WarehouseAgent => "Agent d'entrepôt",
            UserType::CustomerService => "Service client",
            UserType::DeliveryAgent => "Livreur",
            UserType::PickupAgent => "Ramasseur",
            UserType::Seller => "Vendeur",
        }
    }
}

impl core::fmt::Display for UserType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether `actor` may create an account of type `target`.
///
/// Drives which options the user form offers. The backend enforces the real rule.
pub fn can_create_user_type(actor: UserType, target: UserType) -> bool {
    actor.creatable_user_types().contains(&target)
}

/// Coarse access tier, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    Basic,
    Operator,
    Supervisor,
    Administrator,
    Platform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    #[default]
    Active,
    Suspended,
    Pending,
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "ACTIVE"),
            AccountStatus::Suspended => write!(f, "SUSPENDED"),
            AccountStatus::Pending => write!(f, "PENDING"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Validated,
    #[default]
    Pending,
    Rejected,
}
