// Copyright 2025 Planbench Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Whole-pipeline tests: files on disk through planning to results

use std::fs;

use planbench::catalog::{loader, Catalog};
use planbench::executor::Executor;
use planbench::planner::Planner;
use planbench::query::parse_query;
use planbench::Value;

fn load_fixture() -> (tempfile::TempDir, Catalog) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(
        dir.path().join("schema.txt"),
        "actor(id int, fname string, lname string)\n\
         movie(id int, name string)\n\
         casts(mid int, aid int)\n",
    )
    .expect("Failed to write schema");

    let mut actors = String::new();
    for id in 1..=40 {
        let lname = if id % 10 == 1 { "Cruise" } else { "Hanks" };
        actors.push_str(&format!("{}|Tom|{}\n", id, lname));
    }
    fs::write(dir.path().join("actor.txt"), actors).expect("Failed to write actors");

    let mut movies = String::new();
    for id in 1..=25 {
        movies.push_str(&format!("{}|Movie {}\n", id, id));
    }
    fs::write(dir.path().join("movie.txt"), movies).expect("Failed to write movies");

    let mut casts = String::new();
    for i in 0..100 {
        casts.push_str(&format!("{}|{}\n", (i % 25) + 1, (i % 40) + 1));
    }
    fs::write(dir.path().join("casts.txt"), casts).expect("Failed to write casts");

    let mut catalog = Catalog::new();
    loader::load_directory(&mut catalog, dir.path().join("schema.txt"), dir.path())
        .expect("Failed to load catalog");
    (dir, catalog)
}

#[test]
fn test_full_pipeline_three_way_join() {
    let (_dir, catalog) = load_fixture();

    let lines: Vec<String> = "query_start
tables: movie, casts, actor
scalar_filters: actor.lname = Cruise, movie.id < 10
dynamic_filters:
joins: movie.id = casts.mid, casts.aid = actor.id
query_end"
        .lines()
        .map(String::from)
        .collect();

    let components = parse_query(&lines, &catalog).expect("Failed to parse query");
    assert_eq!(components.tables.len(), 3);
    assert_eq!(components.scalar_filters.len(), 2);
    assert_eq!(components.joins.len(), 2);

    let plans = Planner::generate_all(&catalog, &components).expect("Plan generation failed");
    assert_eq!(plans.len(), 5);

    let executor = Executor::new(&catalog);
    let mut row_counts = Vec::new();
    for generated in &plans {
        let result = executor
            .execute_plan(&generated.plan)
            .unwrap_or_else(|e| panic!("{} failed: {}", generated.strategy, e));

        // Every surviving row satisfies both filters
        let lname = result.column_index("lname", "actor").expect("actor.lname");
        let movie_id = result.column_index("id", "movie").expect("movie.id");
        for row in &result.rows {
            assert_eq!(row[lname], Value::text("Cruise"));
            let Value::Integer(id) = &row[movie_id] else {
                panic!("movie.id should be an integer");
            };
            assert!(*id < 10);
        }
        row_counts.push(result.row_count());
    }

    // All strategies agree on the result cardinality
    assert!(row_counts.windows(2).all(|w| w[0] == w[1]));
    assert!(row_counts[0] > 0, "fixture should produce matches");
}

#[test]
fn test_best_plan_cost_is_reported_and_consistent() {
    let (_dir, catalog) = load_fixture();

    let lines: Vec<String> = "query_start
tables: movie, casts
scalar_filters: movie.id = 7
joins: movie.id = casts.mid
query_end"
        .lines()
        .map(String::from)
        .collect();
    let components = parse_query(&lines, &catalog).expect("Failed to parse query");
    let plans = Planner::generate_all(&catalog, &components).expect("Plan generation failed");

    let best = Planner::best(&plans).expect("no best plan");
    assert!(best.plan.estimated_cost > 0.0);
    assert!(plans
        .iter()
        .all(|p| best.plan.estimated_cost <= p.plan.estimated_cost));

    // The selective filter means a filters-first shape must win over the
    // joins-first baseline
    assert_ne!(best.strategy, "JoinsFirst");

    let result = Executor::new(&catalog)
        .execute_plan(&best.plan)
        .expect("Execution failed");
    // movie 7 appears in casts for i % 25 == 6: four cast rows
    assert_eq!(result.row_count(), 4);
}

#[test]
fn test_queries_keep_catalog_reusable() {
    let (_dir, catalog) = load_fixture();
    let executor = Executor::new(&catalog);

    for _ in 0..3 {
        let lines: Vec<String> = "query_start
tables: actor
scalar_filters: actor.lname = Cruise
query_end"
            .lines()
            .map(String::from)
            .collect();
        let components = parse_query(&lines, &catalog).expect("Failed to parse query");
        let plans = Planner::generate_all(&catalog, &components).expect("Plan generation failed");
        let best = Planner::best(&plans).expect("no best plan");
        let result = executor.execute_plan(&best.plan).expect("Execution failed");
        assert_eq!(result.row_count(), 4);
    }
}
