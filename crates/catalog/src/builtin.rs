//! Records shipped with the service.

use crate::record::DiseaseRecord;

struct BuiltinRecord {
    name: &'static str,
    description: &'static str,
    symptoms: [&'static str; 4],
    treatment: &'static str,
    exercise: &'static str,
    sleep_hours: &'static str,
    diet: &'static str,
    tip: &'static str,
}

const BUILTIN: [BuiltinRecord; 4] = [
    BuiltinRecord {
        name: "diabetes",
        description: "A chronic condition that affects how your body processes blood sugar.",
        symptoms: ["Frequent urination", "Increased thirst", "Extreme hunger", "Fatigue"],
        treatment: "Regular exercise, healthy diet, and insulin therapy.",
        exercise: "Engage in moderate-intensity activities such as brisk walking or cycling for 30 minutes daily.",
        sleep_hours: "7-8 hours per night to improve blood sugar levels and manage stress.",
        diet: "Low-carb, high-fiber foods, avoid processed sugars and saturated fats.",
        tip: "Maintain a healthy diet with low sugar intake, and exercise regularly.",
    },
    BuiltinRecord {
        name: "hypertension",
        description: "High blood pressure, often with no symptoms but can lead to severe health issues.",
        symptoms: ["Headache", "Shortness of breath", "Nosebleeds", "Fatigue"],
        treatment: "Medication, lifestyle changes, and regular monitoring.",
        exercise: "30-40 minutes of moderate aerobic exercises like walking, swimming, or cycling.",
        sleep_hours: "7-9 hours to help regulate blood pressure levels.",
        diet: "Low-sodium diet, rich in fruits, vegetables, whole grains, and lean proteins.",
        tip: "Reduce salt intake, manage stress, and exercise regularly.",
    },
    BuiltinRecord {
        name: "heart disease",
        description: "A range of conditions that affect the heart, including coronary artery disease.",
        symptoms: ["Chest pain", "Shortness of breath", "Pain in neck/jaw", "Fatigue"],
        treatment: "Medications, lifestyle changes, and possibly surgery.",
        exercise: "Regular low-intensity exercises, such as walking or yoga, for 30 minutes most days.",
        sleep_hours: "7-9 hours to support heart health.",
        diet: "Mediterranean diet with lots of fruits, vegetables, whole grains, and healthy fats.",
        tip: "Quit smoking, eat heart-healthy foods, and monitor blood pressure.",
    },
    BuiltinRecord {
        name: "asthma",
        description: "A condition where airways narrow and swell, producing extra mucus.",
        symptoms: ["Shortness of breath", "Chest tightness", "Wheezing", "Coughing"],
        treatment: "Inhalers, medication, and avoiding triggers.",
        exercise: "Breathing exercises, light aerobic activities, but avoid outdoor activities in cold weather.",
        sleep_hours: "7-8 hours to help reduce inflammation and maintain respiratory health.",
        diet: "Anti-inflammatory diet with leafy greens, nuts, and healthy oils; avoid processed foods.",
        tip: "Avoid triggers, use prescribed inhalers, and maintain good air quality.",
    },
];

pub(crate) fn records() -> Vec<DiseaseRecord> {
    BUILTIN
        .iter()
        .map(|r| DiseaseRecord {
            name: r.name.to_string(),
            description: r.description.to_string(),
            symptoms: r.symptoms.iter().map(|s| s.to_string()).collect(),
            treatment: r.treatment.to_string(),
            exercise: r.exercise.to_string(),
            sleep_hours: r.sleep_hours.to_string(),
            diet: r.diet.to_string(),
            tip: Some(r.tip.to_string()),
        })
        .collect()
}
