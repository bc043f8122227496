use crate::domain::model::{Package, PackageRef, Subscription};

/// Find the package a subscription points at.
///
/// A bare id is looked up in `packages` (first match); an expanded package is
/// returned as-is, whether or not it also appears in `packages`.
pub fn resolve_package<'a>(
    subscription: Option<&'a Subscription>,
    packages: &'a [Package],
) -> Option<&'a Package> {
    match &subscription?.package_id {
        PackageRef::Id(id) => packages.iter().find(|package| package.id == *id),
        PackageRef::Expanded(package) => Some(package.as_ref()),
    }
}
