use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use handle_vaults::{
    Address, StoreError, U256, VaultRecord, VaultSnapshot, resolve, to_db_hex,
};
use num_bigint::{BigInt, BigUint, ToBigInt};
use serde::{Deserialize, Serialize};

use crate::schema::vaults;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = vaults)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Vault {
    pub id: String,
    pub account: String,
    pub fx_token: String,
    pub debt: BigDecimal,
    pub collateral_as_ether: BigDecimal,
    pub collateral_ratio: BigDecimal,
    pub minimum_ratio: BigDecimal,
    pub is_redeemable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Insertable)]
#[diesel(table_name = vaults)]
pub struct NewVault {
    pub id: String,
    pub account: String,
    pub fx_token: String,
    pub debt: BigDecimal,
    pub collateral_as_ether: BigDecimal,
    pub collateral_ratio: BigDecimal,
    pub minimum_ratio: BigDecimal,
    pub is_redeemable: bool,
    pub updated_at: DateTime<Utc>,
}

/// Columns overwritten when a vault is refreshed. Identity columns never change.
#[derive(Debug, Clone, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = vaults)]
pub struct VaultUpdate {
    pub debt: BigDecimal,
    pub collateral_as_ether: BigDecimal,
    pub collateral_ratio: BigDecimal,
    pub minimum_ratio: BigDecimal,
    pub is_redeemable: bool,
    pub updated_at: DateTime<Utc>,
}

pub fn to_numeric(value: &U256) -> BigDecimal {
    BigDecimal::from(BigInt::from(BigUint::from_bytes_be(
        &value.to_be_bytes::<32>(),
    )))
}

pub fn from_numeric(value: &BigDecimal) -> Result<U256, String> {
    if value.with_scale(0) != *value {
        return Err(format!("{value} is not an integer"));
    }
    let unsigned = value
        .to_bigint()
        .and_then(|int| int.to_biguint())
        .ok_or_else(|| format!("{value} is negative"))?;
    U256::try_from_be_slice(&unsigned.to_bytes_be())
        .ok_or_else(|| format!("{value} does not fit in 256 bits"))
}

impl NewVault {
    pub fn from_record(record: &VaultRecord, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: record.id.as_str().to_string(),
            account: to_db_hex(record.account.as_slice()),
            fx_token: to_db_hex(record.fx_token.as_slice()),
            debt: to_numeric(&record.debt),
            collateral_as_ether: to_numeric(&record.collateral_as_ether),
            collateral_ratio: to_numeric(&record.collateral_ratio),
            minimum_ratio: to_numeric(&record.minimum_ratio),
            is_redeemable: record.is_redeemable,
            updated_at,
        }
    }
}

impl From<&NewVault> for VaultUpdate {
    fn from(vault: &NewVault) -> Self {
        Self {
            debt: vault.debt.clone(),
            collateral_as_ether: vault.collateral_as_ether.clone(),
            collateral_ratio: vault.collateral_ratio.clone(),
            minimum_ratio: vault.minimum_ratio.clone(),
            is_redeemable: vault.is_redeemable,
            updated_at: vault.updated_at,
        }
    }
}

impl Vault {
    pub fn find_by_id(id: &str, conn: &mut diesel::PgConnection) -> QueryResult<Option<Self>> {
        vaults::table.find(id).first(conn).optional()
    }

    /// Insert the vault, or overwrite its figures when the id already exists
    pub fn upsert(new_vault: &NewVault, conn: &mut diesel::PgConnection) -> QueryResult<Self> {
        diesel::insert_into(vaults::table)
            .values(new_vault)
            .on_conflict(vaults::id)
            .do_update()
            .set(&VaultUpdate::from(new_vault))
            .returning(Self::as_returning())
            .get_result(conn)
    }

    /// Rebuilds the domain record, rejecting rows whose id does not match their
    /// pair. `is_redeemable` is recomputed from the stored figures.
    pub fn into_record(self) -> Result<VaultRecord, StoreError> {
        let corrupt = |message: String| StoreError::Corrupt {
            id: self.id.clone(),
            message,
        };

        let account = self
            .account
            .parse::<Address>()
            .map_err(|e| corrupt(format!("account: {e}")))?;
        let fx_token = self
            .fx_token
            .parse::<Address>()
            .map_err(|e| corrupt(format!("fx_token: {e}")))?;

        let id = resolve(&account, &fx_token);
        if !id.as_str().eq_ignore_ascii_case(&self.id) {
            return Err(corrupt(format!("id does not match pair, expected {id}")));
        }

        let snapshot = VaultSnapshot {
            debt: from_numeric(&self.debt).map_err(|e| corrupt(format!("debt: {e}")))?,
            collateral_as_ether: from_numeric(&self.collateral_as_ether)
                .map_err(|e| corrupt(format!("collateral_as_ether: {e}")))?,
            collateral_ratio: from_numeric(&self.collateral_ratio)
                .map_err(|e| corrupt(format!("collateral_ratio: {e}")))?,
            minimum_ratio: from_numeric(&self.minimum_ratio)
                .map_err(|e| corrupt(format!("minimum_ratio: {e}")))?,
        };

        let mut record = VaultRecord::new(account, fx_token);
        record.apply(snapshot);
        if record.is_redeemable != self.is_redeemable {
            tracing::warn!(
                vault_id = %self.id,
                stored = self.is_redeemable,
                computed = record.is_redeemable,
                "[Vault] ⚠️ Stored redeemable flag disagrees with stored figures, using computed value"
            );
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn stored_row(record: &VaultRecord) -> Vault {
        let now = Utc::now();
        let row = NewVault::from_record(record, now);
        Vault {
            id: row.id,
            account: row.account,
            fx_token: row.fx_token,
            debt: row.debt,
            collateral_as_ether: row.collateral_as_ether,
            collateral_ratio: row.collateral_ratio,
            minimum_ratio: row.minimum_ratio,
            is_redeemable: row.is_redeemable,
            created_at: now,
            updated_at: now,
        }
    }

    fn redeemable_record() -> VaultRecord {
        let mut record = VaultRecord::new(Address::repeat_byte(1), Address::repeat_byte(2));
        record.apply(VaultSnapshot {
            debt: U256::from(100u64),
            collateral_as_ether: U256::from(50u64),
            collateral_ratio: U256::from(50u64),
            minimum_ratio: U256::from(150u64),
        });
        record
    }

    #[test]
    fn test_numeric_conversion() {
        assert_eq!(from_numeric(&to_numeric(&U256::MAX)).unwrap(), U256::MAX);
        assert_eq!(
            to_numeric(&U256::MAX).to_string(),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
        assert_eq!(
            from_numeric(&BigDecimal::from_str("42.000").unwrap()).unwrap(),
            U256::from(42u64)
        );
        assert!(from_numeric(&BigDecimal::from_str("-1").unwrap()).is_err());
        assert!(from_numeric(&BigDecimal::from_str("1.5").unwrap()).is_err());
        assert!(
            from_numeric(
                &BigDecimal::from_str(
                    "115792089237316195423570985008687907853269984665640564039457584007913129639936"
                )
                .unwrap()
            )
            .is_err()
        );
    }

    #[test]
    fn test_stored_row_maps_back_to_record() {
        let record = redeemable_record();
        assert!(record.is_redeemable);
        assert_eq!(stored_row(&record).into_record().unwrap(), record);
    }

    #[test]
    fn test_row_with_foreign_id_is_rejected() {
        let mut row = stored_row(&redeemable_record());
        row.id = resolve(&Address::repeat_byte(3), &Address::repeat_byte(2)).into_string();

        assert!(matches!(
            row.into_record(),
            Err(StoreError::Corrupt { message, .. }) if message.contains("id does not match")
        ));
    }

    #[test]
    fn test_redeemable_flag_is_recomputed() {
        let record = redeemable_record();
        let mut row = stored_row(&record);
        row.is_redeemable = false;

        let loaded = row.into_record().unwrap();
        assert!(loaded.is_redeemable);
        assert_eq!(loaded, record);

        let mut row = stored_row(&record);
        row.debt = BigDecimal::from(0);
        row.is_redeemable = true;
        assert!(!row.into_record().unwrap().is_redeemable);
    }

    #[test]
    fn test_corrupt_row_is_rejected() {
        let mut row = stored_row(&redeemable_record());
        row.account = "not an address".to_string();
        assert!(matches!(row.into_record(), Err(StoreError::Corrupt { .. })));

        let mut row = stored_row(&redeemable_record());
        row.debt = BigDecimal::from(-5);
        assert!(matches!(row.into_record(), Err(StoreError::Corrupt { .. })));
    }
}
