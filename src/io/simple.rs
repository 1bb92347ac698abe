//! Simple JSON representation of preference tables (canonical serde_json serialization of `Student` and `Track`
//! objects) and of assignments (one named placement per student).

use crate::{Assignment, PreferenceTable, Seat, Student, Track};
use serde::{Deserialize, Serialize};
use serde_json::json;

const ASSIGNMENT_FORMAT: &str = "X-trackassignment-simple";

/// One student's placement in the assignment output file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Placement {
    student: String,
    track: String,
    /// 1-based seat number within the track
    seat: usize,
    rank: crate::Rank,
}

/// Read a preference table from the simple JSON representation.
///
/// The data is expected as an object with a `students` list (each with `name` and `ranks`, one rank per track) and a
/// `tracks` list (each with `name` and optional `capacity`).
///
/// # Errors
///
/// Fails with a string error message to be displayed to the user, if the file has invalid JSON syntax, misses one of
/// the lists, or describes an invalid preference table.
pub fn read<R: std::io::Read>(reader: R) -> Result<PreferenceTable, String> {
    let mut data: serde_json::Value =
        serde_json::from_reader(reader).map_err(|err| err.to_string())?;

    let students: Vec<Student> =
        serde_json::from_value(data["students"].take()).map_err(|e| format!("{}", e))?;
    let tracks: Vec<Track> =
        serde_json::from_value(data["tracks"].take()).map_err(|e| format!("{}", e))?;

    PreferenceTable::new(students, tracks).map_err(|e| format!("{}", e))
}

/// Write the calculated assignment as simple JSON representation to a Writer (e.g. an output file).
///
/// Each student is listed (in order of the table) with their name, the assigned track's name, the 1-based seat
/// number and the rank of the assigned track.
///
/// # Errors
///
/// Fails, if `assignment` is not a valid assignment of the students of `table` (see `metrics::check_assignment()`) or
/// the data could not be written.
pub fn write<W: std::io::Write>(
    writer: W,
    table: &PreferenceTable,
    assignment: &Assignment,
) -> Result<(), String> {
    crate::metrics::check_assignment(table, assignment).map_err(|e| format!("{}", e))?;
    let placements: Vec<Placement> = table
        .students()
        .iter()
        .zip(assignment.iter())
        .map(|(s, seat)| Placement {
            student: s.name.clone(),
            track: table.tracks()[seat.track].name.clone(),
            seat: seat.seat + 1,
            rank: table.rank(s.index, seat.track),
        })
        .collect();
    let a: serde_json::Value = serde_json::to_value(placements).map_err(|e| format!("{}", e))?;
    let data = json!({
        "format": ASSIGNMENT_FORMAT,
        "version": "1.0",
        "cost": crate::metrics::total_cost(table, assignment),
        "assignment": a
    });
    serde_json::to_writer(writer, &data).map_err(|e| format!("{}", e))?;

    Ok(())
}

/// Read an assignment, written by `write()`, back into an `Assignment` for the students of `table`.
///
/// Students and tracks are matched by name. Every student of the table must be listed exactly once.
pub fn read_assignment<R: std::io::Read>(
    reader: R,
    table: &PreferenceTable,
) -> Result<Assignment, String> {
    let mut data: serde_json::Value =
        serde_json::from_reader(reader).map_err(|err| err.to_string())?;
    if data["format"] != ASSIGNMENT_FORMAT {
        return Err(format!("Data is not in {} format", ASSIGNMENT_FORMAT));
    }
    let placements: Vec<Placement> =
        serde_json::from_value(data["assignment"].take()).map_err(|e| format!("{}", e))?;

    let mut seats: Vec<Option<Seat>> = vec![None; table.students().len()];
    for p in placements.iter() {
        let student = table
            .students()
            .iter()
            .position(|s| s.name == p.student)
            .ok_or_else(|| format!("Unknown student '{}'", p.student))?;
        let track = table
            .tracks()
            .iter()
            .position(|t| t.name == p.track)
            .ok_or_else(|| format!("Unknown track '{}'", p.track))?;
        if p.seat == 0 {
            return Err(format!("Invalid seat number 0 for student '{}'", p.student));
        }
        if seats[student].is_some() {
            return Err(format!("Student '{}' is listed twice", p.student));
        }
        seats[student] = Some(Seat {
            track,
            seat: p.seat - 1,
        });
    }
    let assignment = seats
        .into_iter()
        .enumerate()
        .map(|(i, seat)| seat.ok_or_else(|| format!("Student '{}' is missing", table.students()[i].name)))
        .collect::<Result<Assignment, String>>()?;
    crate::metrics::check_assignment(table, &assignment).map_err(|e| format!("{}", e))?;
    Ok(assignment)
}

/// Write a preference table in the simple JSON representation, such that it can be read by `read()`.
pub fn write_input_data<W: std::io::Write>(
    writer: W,
    table: &PreferenceTable,
) -> Result<(), String> {
    let s: serde_json::Value =
        serde_json::to_value(table.students()).map_err(|e| format!("{}", e))?;
    let t: serde_json::Value = serde_json::to_value(table.tracks()).map_err(|e| format!("{}", e))?;
    let data = json!({
        "format": "X-trackdata-simple",
        "version": "1.0",
        "students": s,
        "tracks": t,
    });
    serde_json::to_writer(writer, &data).map_err(|e| format!("{}", e))?;

    Ok(())
}

#[cfg(test)]
mod test {
    use crate::Seat;

    #[test]
    fn parse_simple_file() {
        let data = include_bytes!("test_ressources/simple_input.json");
        let table = super::read(&data[..]).unwrap();

        assert_eq!(table.students().len(), 5);
        assert_eq!(table.tracks().len(), 3);
        assert_eq!(table.students()[2].name, "Charly Clown");
        assert_eq!(table.students()[2].index, 2);
        assert_eq!(table.students()[2].ranks, vec![3, 1, 2]);
        assert_eq!(table.tracks()[1].name, "Glider Flying");
        assert_eq!(table.tracks()[1].capacity, 1);
        assert_eq!(table.tracks()[2].capacity, crate::DEFAULT_CAPACITY);
        assert_eq!(table.tracks()[2].index, 2);
    }

    #[test]
    fn reject_incomplete_file() {
        let data = br#"{"students": [{"name": "Anton", "ranks": [1]}], "tracks": [{"name": "A"}, {"name": "B"}]}"#;
        let result = super::read(&data[..]);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("no rank for track 1"));

        let data = br#"{"students": []}"#;
        assert!(super::read(&data[..]).is_err());
    }

    #[test]
    fn write_simple_file() {
        let data = include_bytes!("test_ressources/simple_input.json");
        let table = super::read(&data[..]).unwrap();
        let assignment: crate::Assignment = vec![
            Seat { track: 0, seat: 0 },
            Seat { track: 2, seat: 3 },
            Seat { track: 1, seat: 0 },
            Seat { track: 0, seat: 1 },
            Seat { track: 2, seat: 0 },
        ];
        let mut buffer = Vec::<u8>::new();
        let result = super::write(&mut buffer, &table, &assignment);
        assert!(result.is_ok());

        // Parse buffer as JSON file
        let data: serde_json::Value = serde_json::from_reader(&buffer[..]).unwrap();
        assert_eq!(data["format"], "X-trackassignment-simple");
        assert_eq!(data["cost"], 1 + 3 + 1 + 1 + 3);
        assert_eq!(data["assignment"][1]["student"], "Bertålotta Beispiel");
        assert_eq!(data["assignment"][1]["track"], "Rock Climbing");
        assert_eq!(data["assignment"][1]["seat"], 4);
        assert_eq!(data["assignment"][1]["rank"], 3);

        let parsed_assignment = super::read_assignment(&buffer[..], &table).unwrap();
        assert_eq!(assignment, parsed_assignment);
    }

    #[test]
    fn write_rejects_invalid_assignment() {
        let data = include_bytes!("test_ressources/simple_input.json");
        let table = super::read(&data[..]).unwrap();
        // Glider Flying has a single seat only
        let assignment: crate::Assignment = vec![
            Seat { track: 0, seat: 0 },
            Seat { track: 1, seat: 1 },
            Seat { track: 1, seat: 0 },
            Seat { track: 0, seat: 1 },
            Seat { track: 2, seat: 0 },
        ];
        let mut buffer = Vec::<u8>::new();
        assert!(super::write(&mut buffer, &table, &assignment).is_err());
        assert!(super::write(&mut buffer, &table, &assignment[..3].to_vec()).is_err());
    }

    #[test]
    fn read_assignment_rejects_unknown_names() {
        let data = include_bytes!("test_ressources/simple_input.json");
        let table = super::read(&data[..]).unwrap();
        let data = br#"{"format": "X-trackassignment-simple", "version": "1.0",
            "assignment": [{"student": "Nobody", "track": "Sailing", "seat": 1, "rank": 1}]}"#;
        assert_eq!(
            super::read_assignment(&data[..], &table),
            Err(String::from("Unknown student 'Nobody'"))
        );
        let data = br#"{"format": "X-trackdata-simple", "assignment": []}"#;
        assert!(super::read_assignment(&data[..], &table).is_err());
    }

    #[test]
    fn write_and_reread_input_data() {
        let data = include_bytes!("test_ressources/simple_input.json");
        let table = super::read(&data[..]).unwrap();
        let mut buffer = Vec::<u8>::new();
        super::write_input_data(&mut buffer, &table).unwrap();
        let reread = super::read(&buffer[..]).unwrap();
        assert_eq!(table, reread);
    }
}
