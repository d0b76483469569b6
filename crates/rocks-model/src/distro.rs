//! Distribution ordering.

use std::cmp::Ordering;

/// ROS 1 distributions. These always list before any other distribution.
pub static LEGACY_DISTROS: [&str; 6] = ["indigo", "jade", "kinetic", "lunar", "melodic", "noetic"];

/// Sort key: legacy distributions first, then alphabetical within each group.
pub fn distro_order(a: &str, b: &str) -> Ordering {
    let group = |name: &str| u8::from(!LEGACY_DISTROS.contains(&name));
    group(a).cmp(&group(b)).then_with(|| a.cmp(b))
}

/// Sort and dedupe distribution names by [`distro_order`].
pub fn sort_distros<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = names.into_iter().map(Into::into).collect();
    out.sort_by(|a, b| distro_order(a, b));
    out.dedup();
    out
}
