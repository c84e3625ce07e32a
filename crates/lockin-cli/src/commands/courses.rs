use clap::Subcommand;
use lockin_core::integrations::CanvasClient;
use lockin_core::storage::Config;

#[derive(Subcommand)]
pub enum CoursesAction {
    /// List the user's Canvas courses
    List,
    /// Select a course by id (used to title calendar exports)
    Select {
        /// Canvas course id
        id: i64,
    },
    /// List assignments for the selected course
    Assignments,
    /// List announcements for the selected course
    Announcements,
}

fn client(config: &Config) -> Result<CanvasClient, Box<dyn std::error::Error>> {
    let base_url = config
        .canvas
        .base_url
        .as_deref()
        .ok_or("canvas.base_url is not configured")?;
    Ok(CanvasClient::from_keyring(base_url)?)
}

fn selected_course(config: &Config) -> Result<i64, Box<dyn std::error::Error>> {
    config
        .canvas
        .selected_course_id
        .ok_or_else(|| "no course selected; run `lockin courses select <id>`".into())
}

pub async fn run(action: CoursesAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();

    match action {
        CoursesAction::List => {
            let courses = client(&config)?.courses().await?;
            for course in &courses {
                let marker = if config.canvas.selected_course_id == Some(course.id) {
                    " *"
                } else {
                    ""
                };
                println!("{:>8}  {}{}", course.id, course.display_name(), marker);
            }
        }
        CoursesAction::Select { id } => {
            let courses = client(&config)?.courses().await?;
            let course = courses
                .iter()
                .find(|c| c.id == id)
                .ok_or(format!("no course with id {id}"))?;
            config.canvas.selected_course_id = Some(course.id);
            config.canvas.selected_course_name = Some(course.display_name().to_string());
            config.save()?;
            println!("selected course: {}", course.display_name());
        }
        CoursesAction::Assignments => {
            let course_id = selected_course(&config)?;
            let assignments = client(&config)?.assignments(course_id).await?;
            println!("{}", serde_json::to_string_pretty(&assignments)?);
        }
        CoursesAction::Announcements => {
            let course_id = selected_course(&config)?;
            let announcements = client(&config)?.announcements(course_id).await?;
            println!("{}", serde_json::to_string_pretty(&announcements)?);
        }
    }
    Ok(())
}
