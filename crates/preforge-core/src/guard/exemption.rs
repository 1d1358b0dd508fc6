use time::OffsetDateTime;
use time::macros::datetime;

/// Toolchain builds stamped after this instant skip the commit comparison.
///
/// Nightly builds from this point on report commits that do not line up with
/// the workflow pin, so the comparison gives false mismatches. Remove this
/// constant together with [`is_exempt`] once the pinned nightly is past it.
/// Equals epoch milliseconds `1718164800000`.
pub const EXEMPTION_CUTOFF: OffsetDateTime = datetime!(2024-06-12 04:00 UTC);

/// Compared at millisecond precision; sub-millisecond digits of the build
/// stamp are dropped first.
pub fn is_exempt(built_at: OffsetDateTime) -> bool {
    truncate_to_millis(built_at) > EXEMPTION_CUTOFF
}

fn truncate_to_millis(instant: OffsetDateTime) -> OffsetDateTime {
    instant
        .replace_millisecond(instant.millisecond())
        .unwrap_or(instant)
}
