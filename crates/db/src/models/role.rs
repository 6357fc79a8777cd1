use serde::{Deserialize, Serialize};

/// Closed set of role types an invitation can grant.
///
/// Unknown strings resolve to `Empleado`, the base staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    Admin,
    Veterinario,
    Supervisor,
    #[default]
    Empleado,
    Usuario,
}

/// Permission bits (u64 bitfield)
pub mod permissions {
    pub const READ: u64 = 1 << 0;
    pub const CREATE: u64 = 1 << 1;
    pub const UPDATE: u64 = 1 << 2;
    pub const DELETE: u64 = 1 << 3;
    pub const MANAGE_USERS: u64 = 1 << 4;
    pub const GENERATE_CODES: u64 = 1 << 5;
    pub const MANAGE_ANIMALS: u64 = 1 << 6;
    pub const RECORD_HEALTH: u64 = 1 << 7;
    pub const VIEW_MEDICAL_REPORTS: u64 = 1 << 8;
    pub const VIEW_REPORTS: u64 = 1 << 9;

    /// Base permissions every member gets
    pub const BASE: u64 = READ | CREATE | UPDATE;

    /// Full administrative set (ranch owners)
    pub const ADMIN: u64 = BASE | DELETE | MANAGE_USERS | GENERATE_CODES;

    /// Veterinary staff
    pub const VETERINARIO: u64 =
        BASE | MANAGE_ANIMALS | RECORD_HEALTH | VIEW_MEDICAL_REPORTS;

    /// Herd supervisors
    pub const SUPERVISOR: u64 = BASE | MANAGE_ANIMALS | VIEW_REPORTS;

    pub fn has(permissions: u64, flag: u64) -> bool {
        permissions & flag == flag
    }
}

impl RoleType {
    /// Parse a role-type string, falling back to the base staff role.
    pub fn resolve(s: &str) -> Self {
        match s {
            "admin" => RoleType::Admin,
            "veterinario" => RoleType::Veterinario,
            "supervisor" => RoleType::Supervisor,
            "empleado" => RoleType::Empleado,
            "usuario" => RoleType::Usuario,
            _ => RoleType::Empleado,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Admin => "admin",
            RoleType::Veterinario => "veterinario",
            RoleType::Supervisor => "supervisor",
            RoleType::Empleado => "empleado",
            RoleType::Usuario => "usuario",
        }
    }

    /// Permission set granted to members joining under this role type.
    pub fn permissions(&self) -> u64 {
        match self {
            RoleType::Admin => permissions::ADMIN,
            RoleType::Veterinario => permissions::VETERINARIO,
            RoleType::Supervisor => permissions::SUPERVISOR,
            RoleType::Empleado | RoleType::Usuario => permissions::BASE,
        }
    }
}
