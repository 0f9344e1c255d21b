// db/propertydb.rs
use anyhow;
use async_trait::async_trait;
use sqlx::types::BigDecimal;
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    dtos::propertydtos::CreatePropertyDto,
    models::propertymodel::{PackageTier, Property, PropertyStatus, PropertyType},
};

const PROPERTY_COLUMNS: &str = r#"
    id, hunter_id, title, description, property_type,
    address, city, state, country, bedrooms, bathrooms,
    rent_amount, viewing_fee, currency,
    package_group_id, package_position, package_master_id, package_tier,
    status, listed_at, created_at, updated_at
"#;

#[derive(Debug)]
pub struct PropertySearchFilters {
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub bedrooms: Option<i32>,
    pub min_rent: Option<f64>,
    pub max_rent: Option<f64>,
}

#[async_trait]
pub trait PropertyExt {
    async fn create_property(
        &self,
        hunter_id: Uuid,
        property_data: CreatePropertyDto,
    ) -> Result<Property, anyhow::Error>;

    async fn get_property_by_id(&self, property_id: Uuid) -> Result<Option<Property>, sqlx::Error>;

    async fn get_properties_by_hunter(
        &self,
        hunter_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, sqlx::Error>;

    async fn get_active_properties(
        &self,
        filter: PropertySearchFilters,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, sqlx::Error>;

    async fn update_property_status(
        &self,
        property_id: Uuid,
        status: PropertyStatus,
    ) -> Result<Property, sqlx::Error>;

    /// Atomically turns the given properties into one package group.
    /// Candidates are re-checked under row locks inside the transaction so a
    /// concurrent linking attempt cannot produce partial or overlapping
    /// groups; any violation rolls everything back.
    async fn link_package_group(
        &self,
        group_id: Uuid,
        hunter_id: Uuid,
        property_ids: &[Uuid],
        tier: PackageTier,
    ) -> Result<Vec<Property>, anyhow::Error>;

    async fn get_package_members(&self, group_id: Uuid) -> Result<Vec<Property>, sqlx::Error>;

    /// Clears package metadata for every member of the group in one
    /// statement. Returns the number of rows cleared (0 when the group does
    /// not exist, which makes the command idempotent).
    async fn dissolve_package_group(&self, group_id: Uuid) -> Result<u64, sqlx::Error>;
}

#[async_trait]
impl PropertyExt for DBClient {
    async fn create_property(
        &self,
        hunter_id: Uuid,
        property_data: CreatePropertyDto,
    ) -> Result<Property, anyhow::Error> {
        // A hunter cannot list the same address twice
        let existing = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM properties
            WHERE hunter_id = $1 AND LOWER(address) = LOWER($2) AND LOWER(city) = LOWER($3)
            "#,
        )
        .bind(hunter_id)
        .bind(&property_data.address)
        .bind(&property_data.city)
        .fetch_one(&self.pool)
        .await?;

        if existing > 0 {
            return Err(anyhow::anyhow!("Duplicate property listing"));
        }

        let rent_amount = BigDecimal::try_from(property_data.rent_amount)
            .map_err(|_| anyhow::anyhow!("Invalid rent amount"))?;
        let viewing_fee = BigDecimal::try_from(property_data.viewing_fee)
            .map_err(|_| anyhow::anyhow!("Invalid viewing fee"))?;

        let property = sqlx::query_as::<_, Property>(&format!(
            r#"
            INSERT INTO properties
            (hunter_id, title, description, property_type, address, city, state, country,
             bedrooms, bathrooms, rent_amount, viewing_fee, currency, status, listed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW())
            RETURNING {}
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(hunter_id)
        .bind(property_data.title)
        .bind(property_data.description)
        .bind(property_data.property_type)
        .bind(property_data.address)
        .bind(property_data.city)
        .bind(property_data.state)
        .bind(property_data.country)
        .bind(property_data.bedrooms)
        .bind(property_data.bathrooms)
        .bind(rent_amount)
        .bind(viewing_fee)
        .bind(property_data.currency.to_uppercase())
        .bind(PropertyStatus::Active)
        .fetch_one(&self.pool)
        .await?;

        Ok(property)
    }

    async fn get_property_by_id(&self, property_id: Uuid) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {} FROM properties WHERE id = $1
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_properties_by_hunter(
        &self,
        hunter_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let offset = (page - 1) as i64 * limit as i64;

        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {} FROM properties
            WHERE hunter_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(hunter_id)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_active_properties(
        &self,
        filter: PropertySearchFilters,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let offset = (page - 1) as i64 * limit as i64;

        let min_rent = filter.min_rent.and_then(|v| BigDecimal::try_from(v).ok());
        let max_rent = filter.max_rent.and_then(|v| BigDecimal::try_from(v).ok());

        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {} FROM properties
            WHERE status = 'active'
              AND ($1::property_type IS NULL OR property_type = $1)
              AND ($2::text IS NULL OR LOWER(city) = LOWER($2))
              AND ($3::text IS NULL OR LOWER(state) = LOWER($3))
              AND ($4::text IS NULL OR LOWER(country) = LOWER($4))
              AND ($5::int IS NULL OR bedrooms >= $5)
              AND ($6::numeric IS NULL OR rent_amount >= $6)
              AND ($7::numeric IS NULL OR rent_amount <= $7)
            ORDER BY listed_at DESC
            LIMIT $8 OFFSET $9
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(filter.property_type)
        .bind(filter.city)
        .bind(filter.state)
        .bind(filter.country)
        .bind(filter.bedrooms)
        .bind(min_rent)
        .bind(max_rent)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_property_status(
        &self,
        property_id: Uuid,
        status: PropertyStatus,
    ) -> Result<Property, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            UPDATE properties
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(property_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn link_package_group(
        &self,
        group_id: Uuid,
        hunter_id: Uuid,
        property_ids: &[Uuid],
        tier: PackageTier,
    ) -> Result<Vec<Property>, anyhow::Error> {
        let mut tx = self.pool.begin().await?;

        let candidates = sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {} FROM properties
            WHERE id = ANY($1)
            FOR UPDATE
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(property_ids)
        .fetch_all(&mut *tx)
        .await?;

        if candidates.len() != property_ids.len() {
            return Err(anyhow::anyhow!("One or more properties do not exist"));
        }

        for candidate in &candidates {
            if candidate.hunter_id != hunter_id {
                return Err(anyhow::anyhow!(
                    "Property {} does not belong to hunter {}",
                    candidate.id,
                    hunter_id
                ));
            }
            if candidate.package_group_id.is_some() {
                return Err(anyhow::anyhow!(
                    "Property {} already belongs to a package",
                    candidate.id
                ));
            }
        }

        let master_id = property_ids[0];
        let mut linked = Vec::with_capacity(property_ids.len());

        for (index, property_id) in property_ids.iter().enumerate() {
            let position = index as i32 + 1;
            let master = if *property_id == master_id {
                None
            } else {
                Some(master_id)
            };

            let updated = sqlx::query_as::<_, Property>(&format!(
                r#"
                UPDATE properties
                SET package_group_id = $2,
                    package_position = $3,
                    package_master_id = $4,
                    package_tier = $5,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING {}
                "#,
                PROPERTY_COLUMNS
            ))
            .bind(property_id)
            .bind(group_id)
            .bind(position)
            .bind(master)
            .bind(tier)
            .fetch_one(&mut *tx)
            .await?;

            linked.push(updated);
        }

        tx.commit().await?;

        Ok(linked)
    }

    async fn get_package_members(&self, group_id: Uuid) -> Result<Vec<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {} FROM properties
            WHERE package_group_id = $1
            ORDER BY package_position ASC
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn dissolve_package_group(&self, group_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE properties
            SET package_group_id = NULL,
                package_position = NULL,
                package_master_id = NULL,
                package_tier = NULL,
                updated_at = NOW()
            WHERE package_group_id = $1
            "#,
        )
        .bind(group_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
