use mongodb::bson::doc;
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            admin::{AdminView, NewAdminRequest},
            auth::AuthToken,
        },
        db::admin::{Admin, AdminRole, NewAdmin},
        mongodb::{is_duplicate_key, Coll},
    },
};

use super::common::admin_by_token;

pub fn routes() -> Vec<Route> {
    routes![get_admins, create_admin, delete_admin]
}

/// Roster management is the one place the superadmin role matters; it grants
/// nothing extra for phase scheduling.
async fn superadmin_by_token(token: &AuthToken<Admin>, admins: &Coll<Admin>) -> Result<Admin> {
    let admin = admin_by_token(token, admins).await?;
    if admin.role != AdminRole::SuperAdmin {
        return Err(Error::Forbidden(
            "only a superadmin may manage the admin roster".to_string(),
        ));
    }
    Ok(admin)
}

#[get("/admins")]
async fn get_admins(token: AuthToken<Admin>, admins: Coll<Admin>) -> Result<Json<Vec<AdminView>>> {
    superadmin_by_token(&token, &admins).await?;

    let roster: Vec<Admin> = admins.find(None, None).await?.try_collect().await?;
    Ok(Json(roster.into_iter().map(Into::into).collect()))
}

#[post("/admins", data = "<new_admin>", format = "json")]
async fn create_admin(
    token: AuthToken<Admin>,
    new_admin: Json<NewAdminRequest>,
    admins: Coll<Admin>,
    new_admins: Coll<NewAdmin>,
) -> Result<()> {
    superadmin_by_token(&token, &admins).await?;

    let admin: NewAdmin = new_admin.0.try_into()?;
    new_admins.insert_one(&admin, None).await.map_err(|e| {
        if is_duplicate_key(&e) {
            Error::InvalidInput(format!("admin username already in use: {}", admin.username))
        } else {
            e.into()
        }
    })?;
    Ok(())
}

#[delete("/admins/<username>")]
async fn delete_admin(
    token: AuthToken<Admin>,
    username: String,
    admins: Coll<Admin>,
) -> Result<()> {
    superadmin_by_token(&token, &admins).await?;

    let with_username = doc! {
        "username": &username,
    };
    let target = admins
        .find_one(with_username.clone(), None)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Admin {username}")))?;

    // Deleting the last superadmin would lock everyone out of the roster.
    if target.role == AdminRole::SuperAdmin {
        let superadmins = admins
            .count_documents(doc! { "role": AdminRole::SuperAdmin }, None)
            .await?;
        if superadmins <= 1 {
            return Err(Error::InvalidInput(
                "cannot delete the last superadmin".to_string(),
            ));
        }
    }

    admins.delete_one(with_username, None).await?;
    Ok(())
}
