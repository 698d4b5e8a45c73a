//! Identity resolution from environment variables.
//!
//! One identity is one credential set to aggregate contributions for. A set
//! missing a secondary field (the author email) is skipped with a warning;
//! only a completely empty resolution is fatal, and that decision belongs
//! to the caller before any network I/O happens.
//!
//! Resolution reads through an injectable lookup so tests never touch
//! process-global environment state.
//!
//! Environment contract:
//!
//! - `CONTRIBSTATS_AZDO_ORG` / `CONTRIBSTATS_AZDO_TOKEN` /
//!   `CONTRIBSTATS_AZDO_EMAIL` — primary organization credential set.
//! - `CONTRIBSTATS_AZDO_EXTRA_ORGS` — comma-separated secondary org names,
//!   each with `CONTRIBSTATS_AZDO_<ORG>_TOKEN` / `CONTRIBSTATS_AZDO_<ORG>_EMAIL`
//!   (org name uppercased, non-alphanumerics mapped to `_`).
//! - `CONTRIBSTATS_GITHUB_TOKEN` / `CONTRIBSTATS_GITHUB_USER` — token plus
//!   primary username.
//! - `CONTRIBSTATS_GITHUB_EXTRA_USERS` — comma-separated additional
//!   usernames sharing the same token.

/// Credentials for one repository-host organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzdoIdentity {
    pub organization: String,
    pub token: String,
    /// Commits and PRs are attributed by this email.
    pub author_email: String,
}

/// Credentials for one source-host username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubIdentity {
    pub username: String,
    pub token: String,
}

pub const AZDO_ORG: &str = "CONTRIBSTATS_AZDO_ORG";
pub const AZDO_TOKEN: &str = "CONTRIBSTATS_AZDO_TOKEN";
pub const AZDO_EMAIL: &str = "CONTRIBSTATS_AZDO_EMAIL";
pub const AZDO_EXTRA_ORGS: &str = "CONTRIBSTATS_AZDO_EXTRA_ORGS";
pub const GITHUB_TOKEN: &str = "CONTRIBSTATS_GITHUB_TOKEN";
pub const GITHUB_USER: &str = "CONTRIBSTATS_GITHUB_USER";
pub const GITHUB_EXTRA_USERS: &str = "CONTRIBSTATS_GITHUB_EXTRA_USERS";

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Env key fragment for a secondary org name: uppercased, with every
/// non-alphanumeric character mapped to `_`.
fn env_fragment(org: &str) -> String {
    org.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Resolve repository-host identities.
///
/// Returns every usable credential set; sets missing their token or email
/// are logged and dropped rather than aborting the run.
pub fn resolve_azdo<F>(lookup: F) -> Vec<AzdoIdentity>
where
    F: Fn(&str) -> Option<String>,
{
    let mut identities = Vec::new();

    match (
        non_empty(lookup(AZDO_ORG)),
        non_empty(lookup(AZDO_TOKEN)),
        non_empty(lookup(AZDO_EMAIL)),
    ) {
        (Some(organization), Some(token), Some(author_email)) => {
            identities.push(AzdoIdentity {
                organization,
                token,
                author_email,
            });
        }
        (Some(organization), Some(_), None) => {
            tracing::warn!(
                %organization,
                "skipping primary organization: {AZDO_EMAIL} is not set"
            );
        }
        (Some(organization), None, _) => {
            tracing::warn!(
                %organization,
                "skipping primary organization: {AZDO_TOKEN} is not set"
            );
        }
        _ => {}
    }

    if let Some(extra) = non_empty(lookup(AZDO_EXTRA_ORGS)) {
        for org in extra.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let fragment = env_fragment(org);
            let token_key = format!("CONTRIBSTATS_AZDO_{fragment}_TOKEN");
            let email_key = format!("CONTRIBSTATS_AZDO_{fragment}_EMAIL");

            let Some(token) = non_empty(lookup(&token_key)) else {
                tracing::warn!(organization = org, "skipping organization: {token_key} is not set");
                continue;
            };
            let Some(author_email) = non_empty(lookup(&email_key)) else {
                tracing::warn!(organization = org, "skipping organization: {email_key} is not set");
                continue;
            };

            identities.push(AzdoIdentity {
                organization: org.to_string(),
                token,
                author_email,
            });
        }
    }

    identities
}

/// Resolve source-host identities: primary username plus any extras, all
/// sharing one token.
pub fn resolve_github<F>(lookup: F) -> Vec<GithubIdentity>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(token) = non_empty(lookup(GITHUB_TOKEN)) else {
        tracing::warn!("{GITHUB_TOKEN} is not set");
        return Vec::new();
    };

    let mut usernames = Vec::new();
    if let Some(primary) = non_empty(lookup(GITHUB_USER)) {
        usernames.push(primary);
    } else {
        tracing::warn!("{GITHUB_USER} is not set");
    }
    if let Some(extra) = non_empty(lookup(GITHUB_EXTRA_USERS)) {
        for user in extra.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !usernames.iter().any(|u| u == user) {
                usernames.push(user.to_string());
            }
        }
    }

    usernames
        .into_iter()
        .map(|username| GithubIdentity {
            username,
            token: token.clone(),
        })
        .collect()
}

/// Resolve repository-host identities from the process environment.
pub fn resolve_azdo_from_env() -> Vec<AzdoIdentity> {
    resolve_azdo(|key| std::env::var(key).ok())
}

/// Resolve source-host identities from the process environment.
pub fn resolve_github_from_env() -> Vec<GithubIdentity> {
    resolve_github(|key| std::env::var(key).ok())
}
