use super::model::{DataOrigin, Dataset, Gender, Record};

/// Built-in dataset used when the real source cannot be loaded.
///
/// Covers both genders, three BMI categories and three sleep-disorder values.
pub fn fixture_dataset() -> Dataset {
    let rows = [
        (Gender::Male, 35, 7.5, 8, 60.0, 5, "Normal", 72, 8500, "None"),
        (Gender::Female, 42, 6.8, 6, 45.0, 7, "Overweight", 78, 6000, "Insomnia"),
        (Gender::Male, 29, 8.2, 9, 75.0, 4, "Normal", 68, 10000, "None"),
        (Gender::Female, 51, 6.5, 5, 30.0, 8, "Obese", 82, 5000, "Sleep Apnea"),
    ];

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let (gender, age, sleep, quality, activity, stress, bmi, hr, steps, disorder) = row;
            Record {
                person_id: Some(i as u64 + 1),
                gender,
                age: Some(age),
                sleep_duration: Some(sleep),
                quality_of_sleep: Some(quality),
                physical_activity_level: Some(activity),
                stress_level: Some(stress),
                bmi_category: bmi.to_string(),
                heart_rate: Some(hr),
                daily_steps: Some(steps),
                sleep_disorder: disorder.to_string(),
            }
        })
        .collect();

    Dataset::new(records, DataOrigin::Fixture)
}
