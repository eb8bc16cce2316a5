use std::path::Path;
use std::sync::Arc;

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use salary_scenes::data::model::{CompanySize, EmploymentType, ExperienceLevel, REMOTE_RATIOS};
use serde::Serialize;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Index drawn according to relative `weights`.
    fn weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut pick = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if pick < *w {
                return i;
            }
            pick -= w;
        }
        weights.len() - 1
    }
}

/// One output row, laid out like the public `ds_salaries.csv`.
#[derive(Serialize)]
struct Row {
    work_year: i64,
    experience_level: &'static str,
    employment_type: &'static str,
    job_title: &'static str,
    salary_in_usd: i64,
    remote_ratio: i64,
    company_size: &'static str,
}

const TITLES: [&str; 5] = [
    "Data Scientist",
    "Data Engineer",
    "Data Analyst",
    "Machine Learning Engineer",
    "Research Scientist",
];

fn generate(rows: usize, rng: &mut SimpleRng) -> Vec<Row> {
    let years = [2020, 2021, 2022, 2023];
    let year_weights = [0.05, 0.08, 0.35, 0.52];
    let year_factor = [0.95, 0.95, 1.1, 1.2];

    let experience_weights = [0.09, 0.21, 0.67, 0.03];
    let experience_base = [65_000.0, 100_000.0, 150_000.0, 190_000.0];
    let employment_weights = [0.99, 0.003, 0.003, 0.004];
    let employment_factor = [1.0, 0.45, 0.9, 0.4];
    let size_weights = [0.04, 0.84, 0.12];
    let size_factor = [0.7, 1.05, 0.95];
    let remote_weights = [0.51, 0.05, 0.44];

    (0..rows)
        .map(|_| {
            let y = rng.weighted(&year_weights);
            let e = rng.weighted(&experience_weights);
            let t = rng.weighted(&employment_weights);
            let s = rng.weighted(&size_weights);
            let r = rng.weighted(&remote_weights);
            let title = TITLES[(rng.next_u64() % TITLES.len() as u64) as usize];

            let mean = experience_base[e] * year_factor[y] * employment_factor[t] * size_factor[s];
            let salary = rng.gauss(mean, mean * 0.3).max(5_000.0).round() as i64;

            Row {
                work_year: years[y],
                experience_level: ExperienceLevel::ALL[e].code(),
                employment_type: EmploymentType::ALL[t].code(),
                job_title: title,
                salary_in_usd: salary,
                remote_ratio: i64::from(REMOTE_RATIOS[r]),
                company_size: CompanySize::ALL[s].code(),
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create output file");
    for row in rows {
        writer.serialize(row).expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush CSV");
}

fn write_parquet(path: &Path, rows: &[Row]) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("work_year", DataType::Int64, false),
        Field::new("experience_level", DataType::Utf8, false),
        Field::new("employment_type", DataType::Utf8, false),
        Field::new("job_title", DataType::Utf8, false),
        Field::new("salary_in_usd", DataType::Int64, false),
        Field::new("remote_ratio", DataType::Int64, false),
        Field::new("company_size", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.work_year))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.experience_level))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.employment_type))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.job_title))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.salary_in_usd))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.remote_ratio))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.company_size))),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/ds_salaries.csv".to_string());
    let output_path = Path::new(&output);
    if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).expect("Failed to create output directory");
    }

    let mut rng = SimpleRng::new(42);
    let rows = generate(3755, &mut rng);

    match output_path.extension().and_then(|e| e.to_str()) {
        Some("parquet") | Some("pq") => write_parquet(output_path, &rows),
        _ => write_csv(output_path, &rows),
    }

    println!("Wrote {} salary records to {output}", rows.len());
}
