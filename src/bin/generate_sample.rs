use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const OCCUPATIONS: [&str; 6] = [
    "Nurse",
    "Doctor",
    "Engineer",
    "Lawyer",
    "Scientist",
    "Accountant",
];

/// One synthetic individual. `sleep_disorder` is `None` for "no disorder",
/// written as an empty cell like the public dataset does.
struct Person {
    id: i64,
    gender: &'static str,
    age: i64,
    occupation: &'static str,
    sleep_duration: f64,
    quality_of_sleep: i64,
    physical_activity_level: i64,
    stress_level: i64,
    bmi_category: &'static str,
    blood_pressure: String,
    heart_rate: i64,
    daily_steps: i64,
    sleep_disorder: Option<&'static str>,
}

fn generate_person(id: i64, rng: &mut SimpleRng) -> Person {
    let gender = if rng.next_f64() < 0.5 { "Male" } else { "Female" };
    let age = rng.range(27, 59);
    let stress = rng.range(3, 8);

    let sleep = (8.6 - 0.3 * stress as f64 + rng.gauss(0.0, 0.3)).clamp(5.8, 8.5);
    let sleep = (sleep * 10.0).round() / 10.0;
    let quality = ((sleep * 1.6 - 4.0 + rng.gauss(0.0, 0.5)).round() as i64).clamp(4, 9);

    let activity = rng.range(3, 9) * 10;
    let steps = (activity as f64 * 100.0 + rng.gauss(0.0, 800.0)).clamp(3000.0, 10000.0);
    let steps = (steps / 100.0).round() as i64 * 100;

    let roll = rng.next_f64();
    let (bmi, bmi_hr) = if roll < 0.55 {
        ("Normal", 0)
    } else if roll < 0.95 {
        ("Overweight", 4)
    } else {
        ("Obese", 8)
    };
    let heart_rate = (65.0 + stress as f64 + bmi_hr as f64 + rng.gauss(0.0, 2.0)).round() as i64;

    let roll = rng.next_f64();
    let sleep_disorder = match bmi {
        "Normal" if roll < 0.1 => Some("Insomnia"),
        "Normal" => None,
        _ if roll < 0.35 => Some("Sleep Apnea"),
        _ if roll < 0.65 => Some("Insomnia"),
        _ => None,
    };

    let systolic = 115 + stress * 2 + bmi_hr;
    Person {
        id,
        gender,
        age,
        occupation: OCCUPATIONS[rng.range(0, OCCUPATIONS.len() as i64 - 1) as usize],
        sleep_duration: sleep,
        quality_of_sleep: quality,
        physical_activity_level: activity,
        stress_level: stress,
        bmi_category: bmi,
        blood_pressure: format!("{systolic}/{}", systolic - 40),
        heart_rate,
        daily_steps: steps,
        sleep_disorder,
    }
}

const HEADERS: [&str; 13] = [
    "Person ID",
    "Gender",
    "Age",
    "Occupation",
    "Sleep Duration",
    "Quality of Sleep",
    "Physical Activity Level",
    "Stress Level",
    "BMI Category",
    "Blood Pressure",
    "Heart Rate",
    "Daily Steps",
    "Sleep Disorder",
];

fn write_csv(path: &str, people: &[Person]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADERS)?;
    for p in people {
        writer.write_record([
            p.id.to_string(),
            p.gender.to_string(),
            p.age.to_string(),
            p.occupation.to_string(),
            p.sleep_duration.to_string(),
            p.quality_of_sleep.to_string(),
            p.physical_activity_level.to_string(),
            p.stress_level.to_string(),
            p.bmi_category.to_string(),
            p.blood_pressure.clone(),
            p.heart_rate.to_string(),
            p.daily_steps.to_string(),
            p.sleep_disorder.unwrap_or("").to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, people: &[Person]) -> Result<()> {
    let text = |f: fn(&Person) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(people.iter().map(f).collect::<Vec<_>>()))
    };
    let int = |f: fn(&Person) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(people.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        int(|p| p.id),
        text(|p| p.gender),
        int(|p| p.age),
        text(|p| p.occupation),
        Arc::new(Float64Array::from(
            people.iter().map(|p| p.sleep_duration).collect::<Vec<_>>(),
        )),
        int(|p| p.quality_of_sleep),
        int(|p| p.physical_activity_level),
        int(|p| p.stress_level),
        text(|p| p.bmi_category),
        text(|p| p.blood_pressure.as_str()),
        int(|p| p.heart_rate),
        int(|p| p.daily_steps),
        Arc::new(StringArray::from(
            people.iter().map(|p| p.sleep_disorder).collect::<Vec<_>>(),
        )),
    ];

    let schema = Arc::new(Schema::new(
        HEADERS
            .iter()
            .zip(&columns)
            .map(|(name, col)| Field::new(*name, col.data_type().clone(), true))
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let people: Vec<Person> = (1..=374).map(|id| generate_person(id, &mut rng)).collect();

    let csv_path = "sample_sleep_health.csv";
    let parquet_path = "sample_sleep_health.parquet";
    write_csv(csv_path, &people)?;
    write_parquet(parquet_path, &people)?;

    let without = people.iter().filter(|p| p.sleep_disorder.is_none()).count();
    println!(
        "Wrote {} individuals ({without} without a sleep disorder) to {csv_path} and {parquet_path}",
        people.len()
    );
    Ok(())
}
