//! Users and roles
//!
//! Registration and role management only. Passwords and tokens are handled by
//! the identity provider in front of this service.

use tracing::info;

use super::problem::{settle, settle_outcome, ProblemDetails};
use super::{parse_id, require};
use crate::ids::{UserId, UserKind};
use crate::models::{Role, User, UserDraft};
use crate::outcome::{DataOutcome, Outcome};
use crate::repository::{FilterCondition, OrderDirection, Pagination, Repository};

/// Identity use cases over a user and a role repository
///
/// Operations that touch both a user and a role look the user up first and
/// fold the role lookup in with `depend_on`; the first failure decides the
/// response.
#[derive(Debug, Clone)]
pub struct IdentityService<U, Ro> {
    users: U,
    roles: Ro,
}

impl<U, Ro> IdentityService<U, Ro>
where
    U: Repository<User>,
    Ro: Repository<Role>,
{
    pub fn new(users: U, roles: Ro) -> Self {
        Self { users, roles }
    }

    /// The underlying user repository
    pub fn user_repository(&self) -> &U {
        &self.users
    }

    /// The underlying role repository
    pub fn role_repository(&self) -> &Ro {
        &self.roles
    }

    /// Register a user; usernames are unique, including among deleted users
    pub async fn register(&self, draft: UserDraft) -> DataOutcome<User, ProblemDetails> {
        let UserDraft {
            username,
            email,
            display_name,
        } = draft;
        let (username, email) = (username.trim(), email.trim());
        let invalid = require(username, "username").or_else(|| require(email, "email"));
        if let Some(problem) = invalid {
            return DataOutcome::fail(problem);
        }

        let taken = self
            .users
            .all(true)
            .filter(FilterCondition::eq("username", username))
            .count()
            .await;

        let registered = settle(taken.map(DataOutcome::ok))
            .bind(|count| match count {
                0 => DataOutcome::ok(()),
                _ => DataOutcome::fail(ProblemDetails::conflict(format!(
                    "Username '{}' is already taken",
                    username
                ))),
            })
            .bind_async(move |()| async move {
                let mut user = User::new(username, email);
                user.display_name = display_name;
                settle(self.users.add(user).await)
            })
            .await;

        if let Some(user) = registered.data() {
            info!(user_id = %user.id, username = %user.username, "User registered");
        }
        registered
    }

    /// A live user by id
    pub async fn get_user(&self, id: &str) -> DataOutcome<User, ProblemDetails> {
        parse_id::<UserKind>(id)
            .bind_async(|id| self.find_user(id))
            .await
    }

    /// Create a role; names are unique among live roles
    pub async fn create_role(
        &self,
        name: &str,
        description: Option<String>,
    ) -> DataOutcome<Role, ProblemDetails> {
        if let Some(problem) = require(name, "name") {
            return DataOutcome::fail(problem);
        }
        let name = name.trim();

        match self.role_named(name).await {
            DataOutcome::Succeeded(_) => {
                return DataOutcome::fail(ProblemDetails::conflict(format!(
                    "Role '{}' already exists",
                    name
                )));
            }
            // Anything other than "not found" is a real failure
            DataOutcome::Failed(problem) if problem.status != 404 => {
                return DataOutcome::fail(problem);
            }
            DataOutcome::Failed(_) => {}
        }

        let mut role = Role::new(name);
        role.description = description;
        settle(self.roles.add(role).await)
    }

    /// The live role called `name`
    pub async fn role_named(&self, name: &str) -> DataOutcome<Role, ProblemDetails> {
        let name = name.trim();
        let found = self
            .roles
            .all(false)
            .filter(FilterCondition::eq("name", name))
            .paginate(Pagination::first_page(1))
            .fetch()
            .await;

        settle(found.map(DataOutcome::ok)).bind(|roles| match roles.into_iter().next() {
            Some(role) => DataOutcome::ok(role),
            None => DataOutcome::fail(ProblemDetails::not_found(format!(
                "Role '{}' was not found",
                name
            ))),
        })
    }

    /// Every live role
    pub async fn roles(&self) -> DataOutcome<Vec<Role>, ProblemDetails> {
        let fetched = self
            .roles
            .all(false)
            .order_by("name", OrderDirection::Ascending)
            .fetch()
            .await;
        settle(fetched.map(DataOutcome::ok))
    }

    /// Grant an existing role to a user
    pub async fn assign_role(
        &self,
        user_id: &str,
        role_name: &str,
    ) -> DataOutcome<User, ProblemDetails> {
        let role_name = role_name.trim();
        let user = self.get_user(user_id).await;
        if user.failed() {
            return user;
        }
        let role = self.role_named(role_name).await;

        user.and_depend_on(&role)
            .bind_async(|mut user| async move {
                if !user.grant(role_name) {
                    return DataOutcome::ok(user);
                }
                self.save_roles(user).await
            })
            .await
    }

    /// Withdraw a role from a user; withdrawing a role the user lacks is a no-op
    pub async fn revoke_role(
        &self,
        user_id: &str,
        role_name: &str,
    ) -> DataOutcome<User, ProblemDetails> {
        let role_name = role_name.trim();
        let mut user = self.get_user(user_id).await;
        if user.failed() {
            return user;
        }
        let role = self.role_named(role_name).await;
        if !user.depend_on(&role) {
            return user;
        }

        user.bind_async(|mut user| async move {
            if !user.revoke(role_name) {
                return DataOutcome::ok(user);
            }
            self.save_roles(user).await
        })
        .await
    }

    /// Soft delete a user
    pub async fn deactivate_user(&self, id: &str) -> Outcome<ProblemDetails> {
        parse_id::<UserKind>(id)
            .bind_async(|id| self.find_user(id))
            .await
            .bind_async(|user| async move { settle(self.users.delete(&user.id).await) })
            .await
            .without_data()
    }

    /// Seed a batch of roles in one insert
    pub async fn seed_roles(&self, names: &[&str]) -> Outcome<ProblemDetails> {
        let roles = names.iter().map(|name| Role::new(*name)).collect();
        settle_outcome(self.roles.add_range(roles).await)
    }

    async fn find_user(&self, id: UserId) -> DataOutcome<User, ProblemDetails> {
        settle(self.users.find(&id, false).await)
    }

    async fn save_roles(&self, user: User) -> DataOutcome<User, ProblemDetails> {
        let id = user.id.clone();
        settle(self.users.update(&id, user).await)
            .bind_async(|_| self.find_user(id))
            .await
    }
}
