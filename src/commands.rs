//! Command handlers: each one parses nothing, calls the core and prints.

use crate::cli::{AdminArgs, DetailsArgs, FilterArgs, SourceArgs};
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use shelf_catalog::{Admins, Database, Filters, Material, MaterialId, Repository, Resource};
use shelf_config::Config;
use shelf_intake::{Intake, PathGenerator, Submission};
use shelf_storage::backend::LocalBackend;
use shelf_storage::{BackendHandle, StorageBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use tracing::{info, instrument};

/// Everything a command needs, built once at startup.
pub(crate) struct App {
    pub(crate) config: Config,
    pub(crate) db: Database,
}
impl App {
    fn repo(&self) -> Repository {
        Repository::from(&self.db)
    }

    fn backend(&self) -> Result<BackendHandle> {
        let backend = LocalBackend::new("uploads", &self.config.uploads.root).or_raise(|| ErrorKind::Storage)?;
        Ok(Arc::new(backend))
    }

    async fn authorize(&self, admin: &AdminArgs) -> Result<()> {
        let valid = Admins::from(&self.db)
            .verify(&admin.username, &admin.password)
            .await
            .or_raise(|| ErrorKind::Catalog)?;
        if !valid {
            exn::bail!(ErrorKind::Unauthorized);
        }
        Ok(())
    }

    async fn material(&self, id: MaterialId) -> Result<Material> {
        self.repo().get(id).await.or_raise(|| ErrorKind::Catalog)?.ok_or_raise(|| ErrorKind::NotFound(id))
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).or_raise(|| ErrorKind::Io)?;
    println!("{json}");
    Ok(())
}

fn print_material(material: &Material) {
    let details = &material.details;
    println!("#{} {} [{}]", material.id, details.title, details.material_type);
    println!("    {} / {} / {} / {}", details.department, details.semester, details.scheme, details.subject);
    if let Some(description) = &details.description {
        println!("    {description}");
    }
    println!(
        "    by {} ({}, {}), {} views, {} downloads",
        details.contributor.name,
        details.contributor.batch,
        details.contributor.year,
        material.view_count,
        material.download_count,
    );
    println!("    {}", material.resource.link());
}

pub(crate) async fn init(app: &App, seeded: bool) -> Result<()> {
    match seeded {
        true => println!("Catalog initialized at {}", app.config.database.path.display()),
        false => println!("Catalog at {} is already initialized", app.config.database.path.display()),
    }
    let analytics = app.repo().analytics().await.or_raise(|| ErrorKind::Catalog)?;
    println!("{} materials, {} visits", analytics.total_uploads, analytics.total_visits);
    Ok(())
}

pub(crate) async fn search(app: &App, filters: FilterArgs, json: bool) -> Result<()> {
    let filters = Filters::from(filters);
    let materials = app.repo().search(&filters).await.or_raise(|| ErrorKind::Catalog)?;
    if json {
        return print_json(&materials);
    }
    if materials.is_empty() {
        println!("No materials found.");
    }
    for material in &materials {
        print_material(material);
    }
    Ok(())
}

#[instrument(skip_all, fields(username = %admin.username))]
pub(crate) async fn upload(app: &App, admin: AdminArgs, details: DetailsArgs, source: SourceArgs) -> Result<()> {
    app.authorize(&admin).await?;
    let submission = match (source.file, source.video_url) {
        (Some(path), _) => {
            let data = tokio::fs::read(&path).await.or_raise(|| ErrorKind::Io)?;
            let filename = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
            Submission::Document { filename, data }
        },
        (None, Some(url)) => Submission::Video { url },
        // clap's argument group guarantees one of the two.
        (None, None) => exn::bail!(ErrorKind::Usage("either --file or --video-url is required")),
    };
    let paths: PathGenerator = app.config.uploads.template.parse::<PathGenerator>().or_raise(|| ErrorKind::Config)?;
    let intake = Intake::new(app.backend()?, app.repo(), paths);
    let upload = intake.submit(details.into(), submission).await.map_err(|err| {
        let kind = match err.is_rejection() {
            true => ErrorKind::Rejected,
            false => ErrorKind::Intake,
        };
        err.raise(kind)
    })?;
    info!(id = upload.id, by = %admin.username, "material uploaded");
    println!("Uploaded material #{}: {}", upload.id, upload.resource.link());
    Ok(())
}

pub(crate) async fn view(app: &App, id: MaterialId, json: bool) -> Result<()> {
    if !app.repo().increment_views(id).await.or_raise(|| ErrorKind::Catalog)? {
        exn::bail!(ErrorKind::NotFound(id));
    }
    let material = app.material(id).await?;
    match json {
        true => print_json(&material),
        false => {
            print_material(&material);
            Ok(())
        },
    }
}

pub(crate) async fn download(app: &App, id: MaterialId, output: Option<PathBuf>) -> Result<()> {
    let material = app.material(id).await?;
    match &material.resource {
        Resource::Video(url) => println!("{url}"),
        Resource::Document(path) => {
            let stored = Path::new(path);
            let data = app.backend()?.read(stored).await.or_raise(|| ErrorKind::Storage)?;
            let output = match output {
                Some(output) => output,
                None => PathBuf::from(stored.file_name().ok_or_raise(|| ErrorKind::Storage)?),
            };
            tokio::fs::write(&output, data).await.or_raise(|| ErrorKind::Io)?;
            println!("Saved {} to {}", material.details.title, output.display());
        },
    }
    // Only a delivered download counts.
    if !app.repo().increment_downloads(id).await.or_raise(|| ErrorKind::Catalog)? {
        exn::bail!(ErrorKind::NotFound(id));
    }
    Ok(())
}

pub(crate) async fn visit(app: &App) -> Result<()> {
    app.repo().record_visit().await.or_raise(|| ErrorKind::Catalog)
}

pub(crate) async fn stats(app: &App, admin: AdminArgs, json: bool) -> Result<()> {
    app.authorize(&admin).await?;
    let analytics = app.repo().analytics().await.or_raise(|| ErrorKind::Catalog)?;
    if json {
        return print_json(&analytics);
    }
    let last_updated = analytics.last_updated.format(&Rfc3339).or_raise(|| ErrorKind::Io)?;
    println!("Visits:       {}", analytics.total_visits);
    println!("Uploads:      {}", analytics.total_uploads);
    println!("Last visited: {last_updated}");
    Ok(())
}

pub(crate) async fn login(app: &App, admin: AdminArgs) -> Result<()> {
    app.authorize(&admin).await?;
    println!("Credentials valid for {}", admin.username);
    Ok(())
}

#[instrument(skip_all, fields(username = %admin.username))]
pub(crate) async fn passwd(app: &App, admin: AdminArgs, new_password: String) -> Result<()> {
    app.authorize(&admin).await?;
    if new_password.is_empty() {
        exn::bail!(ErrorKind::Usage("the new password must not be empty"));
    }
    let changed = Admins::from(&app.db)
        .set_password(&admin.username, &new_password)
        .await
        .or_raise(|| ErrorKind::Catalog)?;
    if !changed {
        exn::bail!(ErrorKind::Unauthorized);
    }
    println!("Password changed for {}", admin.username);
    Ok(())
}
