//! Core debt tracking and page behavior logic
//!
//! `Tally` owns the loaded data set and every operation that reads or
//! changes it. Mutations are applied to a copy, persisted through the
//! store, and only then become visible.

pub mod error;
pub mod filter;
pub mod models;
pub mod password;
pub mod view;
pub mod whitespace;

use rust_decimal::Decimal;
use tally_config::Config;
use tally_store::{StoreRef, TallyData, TransactionRecord, UserRecord};

pub use error::{CoreError, CoreResult, ErrorCode};
pub use filter::{apply_filter, DescriptionFilter, FilterOutcome, FilteredRow};
pub use models::{transaction_rows, Balance, NewTransaction, TransactionRow};
pub use view::{Appearance, ListRow, TransactionListView};
pub use whitespace::strip_template_indent;

/// Result of a password change request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordChange {
    Changed,
    IncorrectPassword,
    Mismatch,
}

/// Password change form input
#[derive(Debug, Clone, Default)]
pub struct PasswordChangeRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

/// Loaded application data with its backing store
pub struct Tally {
    config: Config,
    store: StoreRef,
    data: TallyData,
}

impl Tally {
    /// Load the data set from the store
    pub async fn open(config: Config, store: StoreRef) -> CoreResult<Self> {
        let data = store.load().await?;
        log::info!("Loaded {} users from {}", data.len(), store.describe());
        Ok(Self { config, store, data })
    }

    /// Apply a change to a copy of the data, persist it, then keep it
    async fn commit<T, F>(&mut self, change: F) -> CoreResult<T>
    where
        F: FnOnce(&mut TallyData) -> CoreResult<T>,
    {
        let mut next = self.data.clone();
        let result = change(&mut next)?;
        self.store.save(&next).await?;
        self.data = next;
        Ok(result)
    }

    // ==================== Users ====================

    /// User names in display order
    pub fn user_names(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    pub fn user(&self, name: &str) -> CoreResult<&UserRecord> {
        self.data.get(name).ok_or_else(|| CoreError::UserNotFound {
            name: name.to_string(),
        })
    }

    pub fn is_admin(&self, name: &str) -> bool {
        self.config.is_admin(name)
    }

    /// Check credentials; a user without a password accepts any password
    pub fn verify_login(&self, name: &str, password: &str) -> CoreResult<bool> {
        let user = self.user(name)?;
        Ok(match &user.password {
            None => true,
            Some(stored) => password::verify_password(password, stored),
        })
    }

    pub fn has_password(&self, name: &str) -> CoreResult<bool> {
        Ok(self.user(name)?.password.is_some())
    }

    /// Add a user from first and last name; names are trimmed and title-cased
    pub async fn add_user(&mut self, first: &str, last: &str, new_password: &str) -> CoreResult<String> {
        let name = tally_utils::full_name(first, last);
        if name.trim().is_empty() {
            return Err(CoreError::ValidationError {
                message: "A name is required".to_string(),
            });
        }
        let password = if new_password.is_empty() {
            None
        } else {
            Some(password::hash_password(new_password)?)
        };
        let added = name.clone();
        self.commit(move |data| {
            if data.contains_key(&name) {
                return Err(CoreError::DuplicateUser { name });
            }
            data.insert(
                name,
                UserRecord {
                    password,
                    ..UserRecord::default()
                },
            );
            Ok(())
        })
        .await?;
        log::info!("Added user {}", added);
        Ok(added)
    }

    pub async fn change_password(
        &mut self,
        name: &str,
        request: &PasswordChangeRequest,
    ) -> CoreResult<PasswordChange> {
        if let Some(stored) = &self.user(name)?.password {
            if !password::verify_password(&request.old_password, stored) {
                return Ok(PasswordChange::IncorrectPassword);
            }
        }
        if request.new_password != request.confirm_new_password {
            return Ok(PasswordChange::Mismatch);
        }
        let hashed = password::hash_password(&request.new_password)?;
        self.commit(|data| {
            user_mut(data, name)?.password = Some(hashed);
            Ok(())
        })
        .await?;
        log::info!("Password changed for {}", name);
        Ok(PasswordChange::Changed)
    }

    /// Remove a user's password after checking it; returns false on a wrong password
    pub async fn remove_password(&mut self, name: &str, current: &str) -> CoreResult<bool> {
        let Some(stored) = &self.user(name)?.password else {
            return Err(CoreError::ValidationError {
                message: "No password is set".to_string(),
            });
        };
        if !password::verify_password(current, stored) {
            return Ok(false);
        }
        self.commit(|data| {
            user_mut(data, name)?.password = None;
            Ok(())
        })
        .await?;
        log::info!("Password removed for {}", name);
        Ok(true)
    }

    // ==================== Appearance ====================

    pub fn appearance(&self, name: &str) -> Appearance {
        Appearance::new(self.data.get(name).map(|u| u.dark_mode).unwrap_or(false))
    }

    /// Flip and persist the dark-mode preference, returning the new value
    pub async fn toggle_dark_mode(&mut self, name: &str) -> CoreResult<bool> {
        let dark = self
            .commit(|data| {
                let user = user_mut(data, name)?;
                let mut appearance = Appearance::new(user.dark_mode);
                user.dark_mode = appearance.toggle();
                Ok(user.dark_mode)
            })
            .await?;
        log::debug!("Dark mode for {} is now {}", name, dark);
        Ok(dark)
    }

    // ==================== Transactions ====================

    pub fn transactions(&self, name: &str) -> CoreResult<&[TransactionRecord]> {
        Ok(&self.user(name)?.transactions)
    }

    pub fn transaction(&self, name: &str, index: usize) -> CoreResult<&TransactionRecord> {
        self.transactions(name)?
            .get(index)
            .ok_or_else(|| CoreError::TransactionNotFound {
                user: name.to_string(),
                index,
            })
    }

    /// Display rows with running totals
    pub fn transaction_rows(&self, name: &str) -> CoreResult<Vec<TransactionRow>> {
        Ok(transaction_rows(self.transactions(name)?))
    }

    /// Filterable list state for a user's history
    pub fn list_view(&self, name: &str, query: &str) -> CoreResult<TransactionListView> {
        Ok(TransactionListView::with_query(self.transaction_rows(name)?, query))
    }

    pub fn balance(&self, name: &str) -> CoreResult<Balance> {
        let total: Decimal = self
            .transactions(name)?
            .iter()
            .map(TransactionRecord::signed_amount)
            .sum();
        Ok(Balance::new(total))
    }

    pub async fn add_transaction(&mut self, name: &str, input: NewTransaction) -> CoreResult<()> {
        let record = input
            .into_record()
            .map_err(|message| CoreError::ValidationError { message })?;
        self.commit(|data| {
            models::insert_transaction(&mut user_mut(data, name)?.transactions, record);
            Ok(())
        })
        .await?;
        log::info!("Added transaction for {}", name);
        Ok(())
    }

    /// Replace a transaction; a changed date moves it to its ordered position
    pub async fn edit_transaction(&mut self, name: &str, index: usize, input: NewTransaction) -> CoreResult<()> {
        let record = input
            .into_record()
            .map_err(|message| CoreError::ValidationError { message })?;
        self.commit(|data| {
            let transactions = &mut user_mut(data, name)?.transactions;
            let existing = transactions
                .get_mut(index)
                .ok_or_else(|| CoreError::TransactionNotFound {
                    user: name.to_string(),
                    index,
                })?;
            if existing.date == record.date {
                *existing = record;
            } else {
                transactions.remove(index);
                models::insert_transaction(transactions, record);
            }
            Ok(())
        })
        .await?;
        log::info!("Edited transaction {} for {}", index, name);
        Ok(())
    }

    pub async fn delete_transaction(&mut self, name: &str, index: usize) -> CoreResult<()> {
        self.commit(|data| {
            let transactions = &mut user_mut(data, name)?.transactions;
            if index >= transactions.len() {
                return Err(CoreError::TransactionNotFound {
                    user: name.to_string(),
                    index,
                });
            }
            transactions.remove(index);
            Ok(())
        })
        .await?;
        log::info!("Deleted transaction {} for {}", index, name);
        Ok(())
    }

    // ==================== Data File ====================

    /// Replace the whole data set with an uploaded file
    pub async fn replace_data(&mut self, file_name: &str, bytes: &[u8]) -> CoreResult<()> {
        let data = tally_store::parse_upload(file_name, bytes).map_err(|e| match e {
            tally_store::StoreError::InvalidData { message } => CoreError::InvalidUpload {
                message: format!("Upload failed: {}", message),
            },
            other => CoreError::from(other),
        })?;
        let users = data.len();
        self.commit(|current| {
            *current = data;
            Ok(())
        })
        .await?;
        log::warn!("Data file replaced by upload ({} users)", users);
        Ok(())
    }
}

fn user_mut<'a>(data: &'a mut TallyData, name: &str) -> CoreResult<&'a mut UserRecord> {
    data.get_mut(name).ok_or_else(|| CoreError::UserNotFound {
        name: name.to_string(),
    })
}

// ==================== Tests ====================
