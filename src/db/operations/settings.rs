use serde::{Deserialize, Serialize};
use sqlx::Row;

use crate::db::{now_iso, Database, DbError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub dark_mode: bool,
    pub notifications: bool,
    pub daily_reminder: bool,
    pub sound_effects: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            notifications: true,
            daily_reminder: true,
            sound_effects: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub dark_mode: Option<bool>,
    pub notifications: Option<bool>,
    pub daily_reminder: Option<bool>,
    pub sound_effects: Option<bool>,
}

impl UserSettings {
    pub fn apply(mut self, patch: SettingsPatch) -> Self {
        if let Some(value) = patch.dark_mode {
            self.dark_mode = value;
        }
        if let Some(value) = patch.notifications {
            self.notifications = value;
        }
        if let Some(value) = patch.daily_reminder {
            self.daily_reminder = value;
        }
        if let Some(value) = patch.sound_effects {
            self.sound_effects = value;
        }
        self
    }
}

pub async fn get_settings(db: &Database, user_id: &str) -> Result<UserSettings, DbError> {
    let row = sqlx::query(
        r#"SELECT "darkMode", "notifications", "dailyReminder", "soundEffects" FROM "user_settings" WHERE "userId" = $1"#,
    )
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Ok(UserSettings::default());
    };

    Ok(UserSettings {
        dark_mode: row.try_get("darkMode")?,
        notifications: row.try_get("notifications")?,
        daily_reminder: row.try_get("dailyReminder")?,
        sound_effects: row.try_get("soundEffects")?,
    })
}

pub async fn save_settings(
    db: &Database,
    user_id: &str,
    settings: &UserSettings,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO "user_settings" ("userId", "darkMode", "notifications", "dailyReminder", "soundEffects", "updatedAt")
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT ("userId") DO UPDATE SET
            "darkMode" = excluded."darkMode",
            "notifications" = excluded."notifications",
            "dailyReminder" = excluded."dailyReminder",
            "soundEffects" = excluded."soundEffects",
            "updatedAt" = excluded."updatedAt"
        "#,
    )
    .bind(user_id)
    .bind(settings.dark_mode)
    .bind(settings.notifications)
    .bind(settings.daily_reminder)
    .bind(settings.sound_effects)
    .bind(now_iso())
    .execute(db.pool())
    .await?;
    Ok(())
}

pub async fn reset_settings(db: &Database, user_id: &str) -> Result<(), DbError> {
    sqlx::query(r#"DELETE FROM "user_settings" WHERE "userId" = $1"#)
        .bind(user_id)
        .execute(db.pool())
        .await?;
    Ok(())
}
