use crate::evaluate::Status;

pub const EXIT_HEALTHY: u8 = 0;
pub const EXIT_DEGRADED: u8 = 1;
pub const EXIT_FAILING: u8 = 2;

/// Missing telemetry outranks severity: any `Unknown` is a failure even if
/// everything else is OK.
pub fn resolve<I>(statuses: I) -> u8
where
    I: IntoIterator<Item = Status>,
{
    let statuses: Vec<Status> = statuses.into_iter().collect();
    if statuses.contains(&Status::Unknown) {
        return EXIT_FAILING;
    }
    if statuses.contains(&Status::Critical) {
        return EXIT_FAILING;
    }
    if statuses.contains(&Status::Warn) {
        return EXIT_DEGRADED;
    }
    EXIT_HEALTHY
}
