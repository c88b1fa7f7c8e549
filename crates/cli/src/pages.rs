//! Interactive pages: the menu, the disease lookup, the risk questionnaire
//! and the yes/no diagnosis dialogue.

use std::io::{BufRead, Write};

use anyhow::Result;
use medassist_risk::{Condition, DietType, Gender, RiskAssessment};
use tracing::debug;

use crate::client::ApiClient;
use crate::prompt::Prompter;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    DiseaseInfo,
    RiskAssessment,
    Diagnosis,
    Quit,
}

impl Page {
    pub const MENU: [(Page, &'static str); 4] = [
        (Page::DiseaseInfo, "Disease information"),
        (Page::RiskAssessment, "Health risk assessment"),
        (Page::Diagnosis, "Symptom diagnosis"),
        (Page::Quit, "Quit"),
    ];

    /// Menu entry by its 1-based number or by a word of its title.
    pub fn from_choice(choice: &str) -> Option<Page> {
        let choice = choice.trim().to_ascii_lowercase();
        if let Ok(index) = choice.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| Self::MENU.get(i))
                .map(|(page, _)| *page);
        }
        match choice.as_str() {
            "info" | "disease" | "disease information" => Some(Page::DiseaseInfo),
            "risk" | "health risk assessment" => Some(Page::RiskAssessment),
            "diagnose" | "diagnosis" | "symptom diagnosis" => Some(Page::Diagnosis),
            "q" | "quit" | "exit" => Some(Page::Quit),
            "home" | "menu" => Some(Page::Home),
            _ => None,
        }
    }
}

pub fn parse_gender(input: &str) -> Option<Gender> {
    match input.trim().to_ascii_lowercase().as_str() {
        "male" | "m" => Some(Gender::Male),
        "female" | "f" => Some(Gender::Female),
        "other" => Some(Gender::Other),
        _ => None,
    }
}

pub fn parse_diet(input: &str) -> Option<DietType> {
    match input.trim().to_ascii_lowercase().as_str() {
        "balanced" => Some(DietType::Balanced),
        "high in fat/sugar" | "high-fat-sugar" | "highfatsugar" => Some(DietType::HighFatSugar),
        "vegetarian" => Some(DietType::Vegetarian),
        "vegan" => Some(DietType::Vegan),
        _ => None,
    }
}

pub fn parse_condition(input: &str) -> Option<Condition> {
    match input.trim().to_ascii_lowercase().as_str() {
        "diabetes" => Some(Condition::Diabetes),
        "hypertension" => Some(Condition::Hypertension),
        "heart disease" | "heart-disease" | "heartdisease" => Some(Condition::HeartDisease),
        "asthma" => Some(Condition::Asthma),
        _ => None,
    }
}

/// Runs pages until the user quits or input ends.
pub async fn run_menu<R: BufRead, W: Write>(
    client: &ApiClient,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let mut page = Page::Home;
    loop {
        debug!(?page, "showing page");
        page = match page {
            Page::Home => {
                prompter.say("\nMedAssist")?;
                for (number, (_, title)) in Page::MENU.iter().enumerate() {
                    prompter.say(&format!("  {}. {}", number + 1, title))?;
                }
                let Some(choice) = prompter.ask_line("Choose a page:")? else {
                    return Ok(());
                };
                match Page::from_choice(&choice) {
                    Some(next) => next,
                    None => {
                        prompter.say("Unknown choice.")?;
                        Page::Home
                    }
                }
            }
            Page::DiseaseInfo => {
                disease_page(client, prompter).await?;
                Page::Home
            }
            Page::RiskAssessment => {
                risk_page(client, prompter).await?;
                Page::Home
            }
            Page::Diagnosis => {
                diagnosis_page(client, prompter).await?;
                Page::Home
            }
            Page::Quit => return Ok(()),
        };
    }
}

pub async fn disease_page<R: BufRead, W: Write>(
    client: &ApiClient,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let Some(name) = prompter.ask_line("Enter disease name:")? else {
        return Ok(());
    };
    if name.is_empty() {
        return Ok(());
    }

    let info = client.disease_info(&name).await?;
    let tip = if info.is_not_found() {
        String::new()
    } else {
        client.health_tip(&name).await?
    };
    prompter.say(&render::disease(&name, &info, &tip))?;

    if let Some(symptom) = prompter.ask_line("Find diseases by symptom (empty to skip):")? {
        if !symptom.is_empty() {
            let related = client.related_diseases(&symptom).await?;
            prompter.say(&render::related(&symptom, &related))?;
        }
    }
    Ok(())
}

/// Questionnaire with the default answer shown for every question.
pub fn ask_assessment<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> Result<RiskAssessment> {
    let defaults = RiskAssessment::default();
    let mut assessment = defaults.clone();

    assessment.age = prompter.ask_parsed("Age", defaults.age)?;
    if let Some(line) = prompter.ask_line("Gender (male/female/other) [male]")? {
        assessment.gender = parse_gender(&line).unwrap_or_default();
    }
    assessment.smoker = prompter.ask_yes_no("Do you smoke?")?.unwrap_or(false);
    assessment.activity_days =
        prompter.ask_parsed("Days of physical activity per week", defaults.activity_days)?;
    assessment.bmi = prompter.ask_parsed("BMI", defaults.bmi)?;
    if let Some(line) =
        prompter.ask_line("Diet (balanced/high in fat/sugar/vegetarian/vegan) [balanced]")?
    {
        assessment.diet = parse_diet(&line).unwrap_or_default();
    }
    assessment.family_history = prompter
        .ask_yes_no("Family history of chronic disease?")?
        .unwrap_or(false);
    assessment.sleep_quality =
        prompter.ask_parsed("Sleep quality (1-10)", defaults.sleep_quality)?;
    assessment.stress_level = prompter.ask_parsed("Stress level (1-10)", defaults.stress_level)?;
    if let Some(line) = prompter.ask_line(
        "Existing conditions, comma separated (diabetes, hypertension, heart disease, asthma)",
    )? {
        for item in line.split(',').filter(|item| !item.trim().is_empty()) {
            match parse_condition(item) {
                Some(condition) => {
                    assessment.existing_conditions.insert(condition);
                }
                None => prompter.say(&format!("Ignoring unknown condition '{}'", item.trim()))?,
            }
        }
    }

    Ok(assessment)
}

pub async fn risk_page<R: BufRead, W: Write>(
    client: &ApiClient,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let assessment = ask_assessment(prompter)?;
    let report = client.assess_risk(&assessment).await?;
    prompter.say(&render::risk(&report))?;
    Ok(())
}

/// Walks one server-side session. End of input discards the session.
pub async fn diagnosis_page<R: BufRead, W: Write>(
    client: &ApiClient,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let mut view = client.start_session().await?;
    while !view.is_terminal() {
        let question = view
            .question_text
            .clone()
            .unwrap_or_else(|| "Do you experience this symptom?".to_string());
        match prompter.ask_yes_no(&question)? {
            Some(present) => view = client.answer(&view.session_id, present).await?,
            None => {
                client.discard_session(&view.session_id).await?;
                return Ok(());
            }
        }
    }

    if let Some(result) = &view.result {
        prompter.say(&render::diagnosis(result))?;
    }
    client.discard_session(&view.session_id).await?;
    Ok(())
}
