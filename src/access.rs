//! Which roles may reach which screens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    #[serde(rename = "Dept Admin")]
    DeptAdmin,
    #[serde(rename = "District Officer")]
    DistrictOfficer,
    #[serde(rename = "Block Officer")]
    BlockOfficer,
    Staff,
    Viewer,
    Guest,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::SuperAdmin,
        Role::DeptAdmin,
        Role::DistrictOfficer,
        Role::BlockOfficer,
        Role::Staff,
        Role::Viewer,
        Role::Guest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::DeptAdmin => "Dept Admin",
            Role::DistrictOfficer => "District Officer",
            Role::BlockOfficer => "Block Officer",
            Role::Staff => "Staff",
            Role::Viewer => "Viewer",
            Role::Guest => "Guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the display name in any case, with spaces, dashes or underscores.
impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().replace(' ', "").to_lowercase() == wanted)
            .ok_or_else(|| ValidationError::UnknownValue {
                kind: "role",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    MasterSettings,
    AddContent,
    VideoLibrary,
    Search,
    Share,
    Reports,
    AuditLogs,
    Settings,
    Help,
}

const ADMINS: &[Role] = &[Role::SuperAdmin, Role::DeptAdmin];
const STAFF: &[Role] = &[
    Role::SuperAdmin,
    Role::DeptAdmin,
    Role::DistrictOfficer,
    Role::BlockOfficer,
    Role::Staff,
];

impl Route {
    /// An empty list admits any signed-in user.
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Route::MasterSettings | Route::Reports | Route::AuditLogs | Route::Settings => ADMINS,
            Route::AddContent | Route::VideoLibrary | Route::Share => STAFF,
            Route::Login | Route::Dashboard | Route::Search | Route::Help => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Route),
}

pub fn guard(role: Option<Role>, route: Route) -> Access {
    let Some(role) = role else {
        return Access::Redirect(Route::Login);
    };
    // guests see everything
    if role == Role::Guest {
        return Access::Allow;
    }
    let allowed = route.allowed_roles();
    if allowed.is_empty() || allowed.contains(&role) {
        Access::Allow
    } else if role == Role::Viewer {
        Access::Redirect(Route::Search)
    } else {
        Access::Redirect(Route::Dashboard)
    }
}
