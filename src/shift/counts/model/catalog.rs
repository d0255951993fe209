//! The fixed universe of tracked roles and the metrics each one records.

/// RSP floor codes, in entry-form order.
pub const RSP_FLOORS: [&str; 6] = ["A2", "A3", "A4", "B2", "B3", "B4"];

/// Metrics recorded for every RSP floor.
pub const RSP_METRICS: &[&str] = &["Headcount", "Piles", "Damages", "LAF", "ISS", "NONCON"];

/// Metrics recorded for the Dock.
pub const DOCK_METRICS: &[&str] = &[
    "Headcount",
    "Piles",
    "Liquid Damages",
    "Dry Damages",
    "LAF",
    "ISS",
    "NC",
];

/// Metrics recorded for Damageland.
pub const DAMAGELAND_METRICS: &[&str] =
    &["Headcount", "Backlog", "Damage Stow", "Received", "Deletes"];

/// Roles that only report a headcount.
pub const OTHER_ROLES: [&str; 4] = [
    "Customer Returns",
    "Inbound Support Services (ICQA)",
    "IOL",
    "GK",
];

pub const RSP_TOTAL: &str = "RSP (Total)";
pub const RSP_HEADCOUNT_TOTAL: &str = "RSP (Headcount Total)";
pub const NON_RSP_HEADCOUNT_TOTAL: &str = "Non-RSP (Headcount Total)";
pub const DOCK: &str = "Dock";
pub const DAMAGELAND: &str = "Damageland";

pub const HEADCOUNT: &str = "Headcount";
pub const PILES: &str = "Piles";

const PILES_ONLY: &[&str] = &[PILES];
const HEADCOUNT_ONLY: &[&str] = &[HEADCOUNT];

/// Category of a tracked role. The category fixes the floor attribute and the
/// metric set of the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    RspFloor(&'static str),
    RspTotal,
    RspHeadcountTotal,
    Dock,
    Damageland,
    Other(&'static str),
    NonRspHeadcountTotal,
}

impl RoleKind {
    /// Resolves a role name against the catalog.
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            RSP_TOTAL => return Some(RoleKind::RspTotal),
            RSP_HEADCOUNT_TOTAL => return Some(RoleKind::RspHeadcountTotal),
            NON_RSP_HEADCOUNT_TOTAL => return Some(RoleKind::NonRspHeadcountTotal),
            DOCK => return Some(RoleKind::Dock),
            DAMAGELAND => return Some(RoleKind::Damageland),
            _ => {}
        }

        if let Some(code) = role
            .strip_prefix("RSP (")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return RSP_FLOORS
                .into_iter()
                .find(|floor| *floor == code)
                .map(RoleKind::RspFloor);
        }

        OTHER_ROLES
            .into_iter()
            .find(|other| *other == role)
            .map(RoleKind::Other)
    }

    /// Role name as written in sheets and in the store.
    pub fn role_name(&self) -> String {
        match self {
            RoleKind::RspFloor(floor) => format!("RSP ({floor})"),
            RoleKind::RspTotal => RSP_TOTAL.to_string(),
            RoleKind::RspHeadcountTotal => RSP_HEADCOUNT_TOTAL.to_string(),
            RoleKind::Dock => DOCK.to_string(),
            RoleKind::Damageland => DAMAGELAND.to_string(),
            RoleKind::Other(name) => (*name).to_string(),
            RoleKind::NonRspHeadcountTotal => NON_RSP_HEADCOUNT_TOTAL.to_string(),
        }
    }

    /// Floor attribute of the role; empty for everything but RSP floors.
    pub fn floor(&self) -> &'static str {
        match self {
            RoleKind::RspFloor(floor) => *floor,
            _ => "",
        }
    }

    /// Ordered metric set recorded for the role.
    pub fn metrics(&self) -> &'static [&'static str] {
        match self {
            RoleKind::RspFloor(_) => RSP_METRICS,
            RoleKind::RspTotal => PILES_ONLY,
            RoleKind::Dock => DOCK_METRICS,
            RoleKind::Damageland => DAMAGELAND_METRICS,
            RoleKind::RspHeadcountTotal
            | RoleKind::Other(_)
            | RoleKind::NonRspHeadcountTotal => HEADCOUNT_ONLY,
        }
    }
}

/// Every tracked role, in entry-form order.
pub fn role_universe() -> Vec<RoleKind> {
    let mut roles: Vec<RoleKind> = RSP_FLOORS.into_iter().map(RoleKind::RspFloor).collect();
    roles.push(RoleKind::RspTotal);
    roles.push(RoleKind::RspHeadcountTotal);
    roles.push(RoleKind::Dock);
    roles.push(RoleKind::Damageland);
    roles.extend(OTHER_ROLES.into_iter().map(RoleKind::Other));
    roles.push(RoleKind::NonRspHeadcountTotal);
    roles
}
