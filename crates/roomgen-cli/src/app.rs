//! Command handling for the roomgen CLI.
//!
//! `App` owns the configuration, the API client and the route guard. Every
//! command that needs a signed-in user checks the guard's route first, the
//! way the mobile app only shows its main area after the session bootstrap.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use futures::future;
use roomgen_core::auth::{open_store, validation, RegisterOutcome};
use roomgen_core::models::{
    Credentials, DesignRecord, DesignUpdate, GenerationJob, NewDesign, ProfileRecord,
    ProfileUpdate, Registration,
};
use roomgen_core::utils::{format_optional, truncate_string};
use roomgen_core::{ApiClient, ApiError, Config, Route, RouteGuard};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{Command, DesignEdit, DesignFields, DesignsCommand, GenerateArgs, ProfileCommand};

/// Width of the prompt column in design listings
const PROMPT_PREVIEW_LENGTH: usize = 40;

pub struct App {
    config: Config,
    api: ApiClient,
    guard: RouteGuard,
    json: bool,
}

impl App {
    pub async fn new(config: Config, json: bool) -> Result<Self> {
        let store = open_store(config.session_backend, config.cache_dir()?);
        let api = ApiClient::from_config(&config, store.clone())
            .context("Invalid API configuration")?;

        let mut guard = RouteGuard::new(store);
        guard.bootstrap().await;

        Ok(Self {
            config,
            api,
            guard,
            json,
        })
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Status => self.status(),
            Command::Login { email } => self.login(email).await,
            Command::Register => self.register().await,
            Command::ForgotPassword { email } => self.forgot_password(&email).await,
            Command::Logout => self.logout().await,
            Command::Home => self.home().await,
            Command::Profile(cmd) => self.profile(cmd).await,
            Command::Designs(cmd) => self.designs(cmd).await,
            Command::Generate(args) => self.generate(args).await,
        }
    }

    /// Turn a failed command into the message shown to the user.
    ///
    /// A rejected token ends the session here; the library leaves that
    /// decision to its callers.
    pub async fn describe_error(&mut self, err: &anyhow::Error) -> String {
        let Some(api_err) = err.downcast_ref::<ApiError>() else {
            return format!("{:#}", err);
        };
        if api_err.is_unauthorized() && self.guard.route().is_authenticated() {
            warn!("Session rejected by server, logging out");
            if let Err(e) = self.guard.logout().await {
                warn!(error = %e, "Failed to clear rejected session");
            }
            return format!(
                "{} Run `roomgen login` to sign in again.",
                api_err.user_message()
            );
        }
        api_err.user_message()
    }

    fn require_session(&self) -> Result<()> {
        if !self.guard.route().is_authenticated() {
            bail!("Not logged in. Run `roomgen login` first.");
        }
        Ok(())
    }

    fn print_json<T: Serialize>(value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    // ===== Session =====

    fn status(&self) -> Result<()> {
        let route = self.guard.route();
        if self.json {
            return Self::print_json(&serde_json::json!({
                "route": route.to_string(),
                "apiBaseUrl": self.api.base_url().as_str(),
                "sessionBackend": self.config.session_backend.to_string(),
            }));
        }
        match route {
            Route::Authenticated => println!("Logged in ({})", self.api.base_url()),
            _ => println!("Not logged in. Run `roomgen login` to sign in."),
        }
        Ok(())
    }

    async fn login(&mut self, email: Option<String>) -> Result<()> {
        let email = match email {
            Some(email) => email,
            None => match self.config.last_email.clone() {
                Some(last) => {
                    let input = prompt_line(&format!("Email [{}]: ", last))?;
                    if input.is_empty() {
                        last
                    } else {
                        input
                    }
                }
                None => prompt_line("Email: ")?,
            },
        };
        let password = rpassword::prompt_password("Password: ")?;
        let credentials = Credentials::new(email, password);

        self.guard.login(&self.api, &credentials).await?;

        self.config.last_email = Some(credentials.email.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
        println!("Login successful!");
        Ok(())
    }

    async fn register(&mut self) -> Result<()> {
        let first_name = prompt_line("First name: ")?;
        let last_name = prompt_line("Last name: ")?;
        let email = prompt_line("Email: ")?;
        let password = rpassword::prompt_password("Password: ")?;
        let confirm = rpassword::prompt_password("Confirm password: ")?;
        validation::validate_password_confirmation(&password, &confirm).map_err(ApiError::from)?;

        let registration = Registration {
            email,
            password,
            first_name,
            last_name,
        };
        match self.guard.register(&self.api, &registration).await? {
            RegisterOutcome::LoggedIn => {
                self.config.last_email = Some(registration.email.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                println!("Registration successful! You are now logged in.");
            }
            RegisterOutcome::LoginRequired { message } => {
                println!(
                    "{} Please log in with `roomgen login`.",
                    message.unwrap_or_else(|| "Registration successful!".to_string())
                );
            }
        }
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<()> {
        self.api.forgot_password(email).await?;
        println!(
            "If an account exists with this email, you will receive password reset instructions."
        );
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        self.guard.logout().await.context("Error logging out")?;
        println!("Logged out.");
        Ok(())
    }

    async fn home(&self) -> Result<()> {
        self.require_session()?;
        let (profile, designs, favorites) = future::join3(
            self.api.get_profile(),
            self.api.get_my_designs(),
            self.api.get_favorites(),
        )
        .await;
        let (profile, designs, favorites) = (profile?, designs?, favorites?);

        if self.json {
            return Self::print_json(&serde_json::json!({
                "profile": profile,
                "designs": designs.len(),
                "favorites": favorites.len(),
            }));
        }
        println!("Welcome back, {}!", profile.full_name());
        println!("  Designs:   {}", designs.len());
        println!("  Favorites: {}", favorites.len());
        if let Some(latest) = designs.first() {
            println!("  Latest:    {}", design_line(latest));
        }
        Ok(())
    }

    // ===== Profile =====

    async fn profile(&self, cmd: ProfileCommand) -> Result<()> {
        self.require_session()?;
        match cmd {
            ProfileCommand::Show => {
                let profile = self.api.get_profile().await?;
                self.print_profile(&profile)
            }
            ProfileCommand::Update {
                first_name,
                last_name,
                email,
            } => {
                let update = ProfileUpdate {
                    first_name,
                    last_name,
                    email,
                };
                if update.is_empty() {
                    bail!("Nothing to update. Pass --first-name, --last-name or --email.");
                }
                let current = self.api.get_profile().await?;
                self.api.update_profile(&current.merged(&update)).await?;
                info!("Profile updated");

                // Show what the server now holds
                let refreshed = self.api.get_profile().await?;
                if !self.json {
                    println!("Profile updated successfully");
                }
                self.print_profile(&refreshed)
            }
        }
    }

    fn print_profile(&self, profile: &ProfileRecord) -> Result<()> {
        if self.json {
            return Self::print_json(profile);
        }
        let name = profile.full_name();
        println!("Name:  {}", format_optional(Some(name.as_str()), "-"));
        println!("Email: {}", format_optional(Some(profile.email.as_str()), "-"));
        Ok(())
    }

    // ===== Designs =====

    async fn designs(&self, cmd: DesignsCommand) -> Result<()> {
        self.require_session()?;
        match cmd {
            DesignsCommand::List => {
                let designs = self.api.get_my_designs().await?;
                self.print_designs(&designs, "No designs yet. Create one with `roomgen generate`.")
            }
            DesignsCommand::Favorites => {
                let designs = self.api.get_favorites().await?;
                self.print_designs(&designs, "No favorites yet. Mark one with `roomgen designs favorite <id>`.")
            }
            DesignsCommand::Show { id } => {
                let design = self.api.get_design_by_id(&id).await?;
                self.print_design(&design)
            }
            DesignsCommand::Create(fields) => {
                let design = self.api.create_design(&new_design(fields)).await?;
                self.print_design(&design)
            }
            DesignsCommand::Update { id, fields } => {
                let update = design_update(fields);
                if update.is_empty() {
                    bail!("Nothing to update. Pass --prompt, --room-type or --style.");
                }
                let design = self.api.update_design(&id, &update).await?;
                self.print_design(&design)
            }
            DesignsCommand::Favorite { id } => {
                self.api.toggle_favorite(&id, true).await?;
                println!("Added to favorites");
                Ok(())
            }
            DesignsCommand::Unfavorite { id } => {
                self.api.toggle_favorite(&id, false).await?;
                println!("Removed from favorites");
                Ok(())
            }
            DesignsCommand::Delete { id, yes } => {
                if !yes {
                    let answer = prompt_line("Are you sure you want to delete this design? [y/N] ")?;
                    if !answer.eq_ignore_ascii_case("y") {
                        println!("Cancelled.");
                        return Ok(());
                    }
                }
                self.api.delete_design(&id).await?;
                println!("Design deleted.");
                Ok(())
            }
        }
    }

    fn print_designs(&self, designs: &[DesignRecord], empty_message: &str) -> Result<()> {
        if self.json {
            return Self::print_json(&designs);
        }
        if designs.is_empty() {
            println!("{}", empty_message);
            return Ok(());
        }
        for design in designs {
            println!("{}", design_line(design));
        }
        Ok(())
    }

    fn print_design(&self, design: &DesignRecord) -> Result<()> {
        if self.json {
            return Self::print_json(design);
        }
        println!("Design #{} ({})", design.short_id(), design.id);
        println!("  Created:   {}", format_optional(design.created_on().as_deref(), "-"));
        println!("  Room:      {}", format_optional(design.room_type_label().as_deref(), "-"));
        println!("  Style:     {}", format_optional(design.style.as_deref(), "-"));
        println!("  Prompt:    {}", format_optional(design.prompt.as_deref(), "-"));
        println!("  Before:    {}", format_optional(design.original_image_url.as_deref(), "-"));
        println!("  After:     {}", format_optional(design.generated_image_url.as_deref(), "-"));
        println!("  Favorite:  {}", if design.is_favorite { "yes" } else { "no" });
        Ok(())
    }

    // ===== Generation =====

    async fn generate(&self, args: GenerateArgs) -> Result<()> {
        self.require_session()?;
        let image = tokio::fs::read(&args.image)
            .await
            .with_context(|| format!("Failed to read image {}", args.image.display()))?;

        let job = GenerationJob {
            image,
            prompt: args.prompt,
            room_type: args.room_type,
            style: args.style,
        };
        if !self.json {
            println!("Generating {} design, this can take a while...", job.style.title());
        }
        let result = self.api.generate_image(job).await?;

        if self.json {
            return Self::print_json(&result);
        }
        println!("Before: {}", result.original_image_url);
        println!("After:  {}", result.generated_image_url);
        if let Some(design) = result.design {
            println!("Saved as design #{}", design.short_id());
        }
        Ok(())
    }
}

fn design_line(design: &DesignRecord) -> String {
    format!(
        "{:<8}  {:<12}  {:<14}  {:<12}  {:<3}  {}",
        design.short_id(),
        format_optional(design.created_on().as_deref(), "-"),
        format_optional(design.room_type_label().as_deref(), "-"),
        format_optional(design.style.as_deref(), "-"),
        if design.is_favorite { "*" } else { "" },
        truncate_string(design.prompt.as_deref().unwrap_or_default(), PROMPT_PREVIEW_LENGTH),
    )
}

fn new_design(fields: DesignFields) -> NewDesign {
    NewDesign {
        prompt: fields.prompt,
        room_type: fields.room_type,
        style: fields.style.map(|s| s.id().to_string()),
        original_image_url: fields.original_url,
        generated_image_url: fields.generated_url,
    }
}

fn design_update(fields: DesignEdit) -> DesignUpdate {
    DesignUpdate {
        prompt: fields.prompt,
        room_type: fields.room_type,
        style: fields.style.map(|s| s.id().to_string()),
        is_favorite: None,
    }
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
