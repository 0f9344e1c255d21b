// service/package_service.rs
use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{db::DBClient, propertydb::PropertyExt},
    dtos::propertydtos::LinkPackageDto,
    models::propertymodel::Property,
    service::{audit_service::AuditService, error::ServiceError},
};

/// Minimum number of listings in a viewing package. The request DTO caps
/// the list at three, so groups end up exactly three strong.
pub const MIN_PACKAGE_SIZE: usize = 3;

/// Checks a candidate set read outside the transaction. The persistence
/// layer repeats the ownership and membership checks under row locks, so
/// this mainly exists to give callers a precise error before any write is
/// attempted.
pub fn validate_candidates(
    candidates: &[Property],
    hunter_id: Uuid,
) -> Result<(), ServiceError> {
    if candidates.len() < MIN_PACKAGE_SIZE {
        return Err(ServiceError::Validation(format!(
            "A package needs at least {} properties, got {}",
            MIN_PACKAGE_SIZE,
            candidates.len()
        )));
    }

    let unique: HashSet<Uuid> = candidates.iter().map(|p| p.id).collect();
    if unique.len() != candidates.len() {
        return Err(ServiceError::Validation(
            "Duplicate property ids in package candidates".to_string(),
        ));
    }

    for candidate in candidates {
        if candidate.hunter_id != hunter_id {
            return Err(ServiceError::Validation(format!(
                "Property {} is not owned by hunter {}",
                candidate.id, hunter_id
            )));
        }
        if candidate.package_group_id.is_some() {
            return Err(ServiceError::Validation(format!(
                "Property {} already belongs to a package",
                candidate.id
            )));
        }
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct PackageService {
    db_client: Arc<DBClient>,
    audit_service: Arc<AuditService>,
}

impl PackageService {
    pub fn new(db_client: Arc<DBClient>, audit_service: Arc<AuditService>) -> Self {
        Self {
            db_client,
            audit_service,
        }
    }

    /// Links the given properties into one tiered package. All-or-nothing:
    /// the multi-row update runs in a single transaction and any violation
    /// aborts with no partial linkage.
    pub async fn link_properties(
        &self,
        admin_id: Uuid,
        data: LinkPackageDto,
    ) -> Result<Vec<Property>, ServiceError> {
        let mut candidates = Vec::with_capacity(data.property_ids.len());
        for property_id in &data.property_ids {
            let property = self
                .db_client
                .get_property_by_id(*property_id)
                .await?
                .ok_or(ServiceError::PropertyNotFound(*property_id))?;
            candidates.push(property);
        }

        validate_candidates(&candidates, data.hunter_id)?;

        let group_id = Uuid::new_v4();
        let linked = self
            .db_client
            .link_package_group(group_id, data.hunter_id, &data.property_ids, data.tier)
            .await
            .map_err(|err| match err.downcast::<sqlx::Error>() {
                Ok(db_err) => ServiceError::Database(db_err),
                Err(other) => ServiceError::Validation(other.to_string()),
            })?;

        tracing::info!(
            "Linked {} properties into package {} (tier {}) for hunter {}",
            linked.len(),
            group_id,
            data.tier.to_str(),
            data.hunter_id
        );

        self.audit_service
            .log_package_linked(admin_id, group_id, &data)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("audit log failed for package {}: {}", group_id, err)
            });

        Ok(linked)
    }

    /// Clears a package group. Idempotent: dissolving a group that no
    /// longer exists succeeds with zero rows touched.
    pub async fn dissolve_package(
        &self,
        admin_id: Uuid,
        group_id: Uuid,
    ) -> Result<u64, ServiceError> {
        let cleared = self.db_client.dissolve_package_group(group_id).await?;

        if cleared > 0 {
            tracing::info!("Dissolved package {} ({} properties)", group_id, cleared);
        }

        self.audit_service
            .log_package_dissolved(admin_id, group_id, cleared)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("audit log failed for package {}: {}", group_id, err)
            });

        Ok(cleared)
    }

    pub async fn get_package(&self, group_id: Uuid) -> Result<Vec<Property>, ServiceError> {
        let members = self.db_client.get_package_members(group_id).await?;

        if members.is_empty() {
            return Err(ServiceError::PackageNotFound(group_id));
        }

        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::propertymodel::{PackageTier, PropertyStatus, PropertyType};
    use sqlx::types::BigDecimal;

    fn property(hunter_id: Uuid, group: Option<Uuid>) -> Property {
        Property {
            id: Uuid::new_v4(),
            hunter_id,
            title: "Two-bed flat".to_string(),
            description: "A bright two-bedroom flat close to transit".to_string(),
            property_type: PropertyType::Apartment,
            address: "12 Harbour Road".to_string(),
            city: "Lagos".to_string(),
            state: "Lagos".to_string(),
            country: "Nigeria".to_string(),
            bedrooms: Some(2),
            bathrooms: Some(1),
            rent_amount: BigDecimal::try_from(1200.0).unwrap(),
            viewing_fee: BigDecimal::try_from(25.0).unwrap(),
            currency: "NGN".to_string(),
            package_group_id: group,
            package_position: group.map(|_| 1),
            package_master_id: None,
            package_tier: group.map(|_| PackageTier::Gold),
            status: PropertyStatus::Active,
            listed_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_accepts_three_ungrouped_same_hunter() {
        let hunter = Uuid::new_v4();
        let candidates = vec![property(hunter, None), property(hunter, None), property(hunter, None)];

        assert!(validate_candidates(&candidates, hunter).is_ok());
    }

    #[test]
    fn test_rejects_too_few_candidates() {
        let hunter = Uuid::new_v4();
        let candidates = vec![property(hunter, None), property(hunter, None)];

        assert!(matches!(
            validate_candidates(&candidates, hunter),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_foreign_property() {
        let hunter = Uuid::new_v4();
        let candidates = vec![
            property(hunter, None),
            property(hunter, None),
            property(Uuid::new_v4(), None),
        ];

        assert!(matches!(
            validate_candidates(&candidates, hunter),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_already_grouped_property() {
        let hunter = Uuid::new_v4();
        let candidates = vec![
            property(hunter, None),
            property(hunter, None),
            property(hunter, Some(Uuid::new_v4())),
        ];

        assert!(matches!(
            validate_candidates(&candidates, hunter),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let hunter = Uuid::new_v4();
        let repeated = property(hunter, None);
        let candidates = vec![repeated.clone(), repeated, property(hunter, None)];

        assert!(matches!(
            validate_candidates(&candidates, hunter),
            Err(ServiceError::Validation(_))
        ));
    }
}
