use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend};

/// Stored procedures and triggers the application calls by name.
///
/// Routines are MySQL dialect; on any other backend this migration is a no-op
/// so the schema can still be exercised on SQLite.
#[derive(DeriveMigrationName)]
pub struct Migration;

enum RoutineKind {
    Procedure,
    Trigger,
}

struct Routine {
    name: &'static str,
    kind: RoutineKind,
    body: &'static str,
}

const ROUTINES: &[Routine] = &[
    Routine {
        name: "GetDelayedFlights",
        kind: RoutineKind::Procedure,
        body: GET_DELAYED_FLIGHTS,
    },
    Routine {
        name: "GetRouteDelayAnalysis",
        kind: RoutineKind::Procedure,
        body: GET_ROUTE_DELAY_ANALYSIS,
    },
    Routine {
        name: "GetWeatherImpactOnDelays",
        kind: RoutineKind::Procedure,
        body: GET_WEATHER_IMPACT_ON_DELAYS,
    },
    Routine {
        name: "GetAirlinePerformanceMetrics",
        kind: RoutineKind::Procedure,
        body: GET_AIRLINE_PERFORMANCE_METRICS,
    },
    Routine {
        name: "UpdateFlightStatusWithPrediction",
        kind: RoutineKind::Procedure,
        body: UPDATE_FLIGHT_STATUS_WITH_PREDICTION,
    },
    Routine {
        name: "BulkCancellationDueToWeather",
        kind: RoutineKind::Procedure,
        body: BULK_CANCELLATION_DUE_TO_WEATHER,
    },
    Routine {
        name: "after_flight_status_update",
        kind: RoutineKind::Trigger,
        body: AFTER_FLIGHT_STATUS_UPDATE,
    },
    Routine {
        name: "before_flight_status_insert",
        kind: RoutineKind::Trigger,
        body: BEFORE_FLIGHT_STATUS_INSERT,
    },
    Routine {
        name: "after_weather_event_insert",
        kind: RoutineKind::Trigger,
        body: AFTER_WEATHER_EVENT_INSERT,
    },
];

impl Routine {
    fn drop_sql(&self) -> String {
        match self.kind {
            RoutineKind::Procedure => format!("DROP PROCEDURE IF EXISTS {}", self.name),
            RoutineKind::Trigger => format!("DROP TRIGGER IF EXISTS {}", self.name),
        }
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::MySql {
            return Ok(());
        }

        let db = manager.get_connection();
        for routine in ROUTINES {
            db.execute_unprepared(&routine.drop_sql()).await?;
            db.execute_unprepared(routine.body).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::MySql {
            return Ok(());
        }

        let db = manager.get_connection();
        for routine in ROUTINES.iter().rev() {
            db.execute_unprepared(&routine.drop_sql()).await?;
        }

        Ok(())
    }
}

// Two result sets: the delayed flights, then summary statistics over the same filter.
const GET_DELAYED_FLIGHTS: &str = r"
CREATE PROCEDURE GetDelayedFlights(
    IN p_threshold INT,
    IN p_start_date DATE,
    IN p_end_date DATE,
    IN p_airline_code VARCHAR(10),
    IN p_max_results INT
)
BEGIN
    SET p_threshold = IFNULL(p_threshold, 15);
    SET p_max_results = IFNULL(p_max_results, 100);

    SELECT
        f.flightId,
        f.airlineCode,
        f.flightNumber,
        al.name AS airline_name,
        f.originAirport,
        orig.name AS origin_name,
        orig.city AS origin_city,
        f.destAirport,
        dest.name AS dest_name,
        dest.city AS dest_city,
        fs.flightDate,
        f.scheduledDepartureTime,
        f.scheduledArrivalTime,
        fs.actualDepartureTime,
        fs.actualArrivalTime,
        fs.departureDelay,
        fs.arrivalDelay,
        CASE
            WHEN fs.cancelled = 1 THEN 'Cancelled'
            WHEN fs.diverted = 1 THEN 'Diverted'
            WHEN fs.departureDelay > p_threshold THEN 'Delayed'
            ELSE 'On Time'
        END AS flight_status,
        CASE
            WHEN fs.weatherDelay > 0 THEN 'Weather'
            WHEN fs.carrierDelay > 0 THEN 'Carrier'
            WHEN fs.nasDelay > 0 THEN 'Air Traffic'
            WHEN fs.securityDelay > 0 THEN 'Security'
            WHEN fs.lateAircraftDelay > 0 THEN 'Late Aircraft'
            ELSE 'Unknown'
        END AS delay_reason,
        GREATEST(
            COALESCE(fs.weatherDelay, 0),
            COALESCE(fs.carrierDelay, 0),
            COALESCE(fs.nasDelay, 0),
            COALESCE(fs.securityDelay, 0),
            COALESCE(fs.lateAircraftDelay, 0)
        ) AS primary_delay_minutes
    FROM Flight f
    JOIN Flight_Status fs ON f.flightId = fs.flightId
    JOIN Airline al ON f.airlineCode = al.airlineCode
    JOIN Airport orig ON f.originAirport = orig.airportCode
    JOIN Airport dest ON f.destAirport = dest.airportCode
    WHERE (fs.departureDelay > p_threshold OR fs.cancelled = 1)
      AND (p_start_date IS NULL OR fs.flightDate >= p_start_date)
      AND (p_end_date IS NULL OR fs.flightDate <= p_end_date)
      AND (p_airline_code IS NULL OR f.airlineCode = p_airline_code)
    ORDER BY fs.departureDelay DESC
    LIMIT p_max_results;

    SELECT
        COUNT(*) AS total_delayed_flights,
        SUM(fs.cancelled) AS cancelled_flights,
        SUM(fs.diverted) AS diverted_flights,
        ROUND(AVG(fs.departureDelay), 2) AS avg_departure_delay,
        ROUND(AVG(fs.arrivalDelay), 2) AS avg_arrival_delay,
        ROUND(AVG(CASE WHEN fs.carrierDelay > 0 THEN fs.carrierDelay ELSE NULL END), 2) AS avg_carrier_delay,
        ROUND(AVG(CASE WHEN fs.weatherDelay > 0 THEN fs.weatherDelay ELSE NULL END), 2) AS avg_weather_delay,
        ROUND(AVG(CASE WHEN fs.nasDelay > 0 THEN fs.nasDelay ELSE NULL END), 2) AS avg_nas_delay
    FROM Flight f
    JOIN Flight_Status fs ON f.flightId = fs.flightId
    WHERE (fs.departureDelay > p_threshold OR fs.cancelled = 1)
      AND (p_start_date IS NULL OR fs.flightDate >= p_start_date)
      AND (p_end_date IS NULL OR fs.flightDate <= p_end_date)
      AND (p_airline_code IS NULL OR f.airlineCode = p_airline_code);
END
";

const GET_ROUTE_DELAY_ANALYSIS: &str = r"
CREATE PROCEDURE GetRouteDelayAnalysis()
BEGIN
    SELECT
        f.originAirport,
        orig.name AS origin_name,
        f.destAirport,
        dest.name AS dest_name,
        COUNT(fs.statusId) AS total_flights,
        ROUND(AVG(fs.departureDelay), 2) AS avg_departure_delay,
        ROUND(AVG(fs.arrivalDelay), 2) AS avg_arrival_delay,
        SUM(fs.cancelled) AS cancelled_flights,
        ROUND(AVG(f.distance), 0) AS avg_distance,
        ROUND(
            (AVG(fs.departureDelay) + AVG(fs.arrivalDelay)) /
            NULLIF(AVG(f.distance), 0) * 100,
            2
        ) AS delay_per_100_miles
    FROM Flight f
    JOIN Flight_Status fs ON f.flightId = fs.flightId
    JOIN Airport orig ON f.originAirport = orig.airportCode
    JOIN Airport dest ON f.destAirport = dest.airportCode
    GROUP BY f.originAirport, orig.name, f.destAirport, dest.name
    HAVING total_flights >= 5
    ORDER BY delay_per_100_miles DESC
    LIMIT 20;
END
";

const GET_WEATHER_IMPACT_ON_DELAYS: &str = r"
CREATE PROCEDURE GetWeatherImpactOnDelays(
    IN p_airport_code VARCHAR(10),
    IN p_start_date DATE,
    IN p_end_date DATE
)
BEGIN
    SELECT
        we.eventId,
        we.type AS weather_type,
        we.severity AS weather_severity,
        DATE(we.startTime) AS event_date,
        COUNT(fs.statusId) AS total_flights,
        SUM(CASE WHEN fs.departureDelay > 15 THEN 1 ELSE 0 END) AS delayed_flights,
        SUM(fs.cancelled) AS cancelled_flights,
        ROUND(AVG(fs.departureDelay), 2) AS avg_departure_delay,
        ROUND(AVG(fs.weatherDelay), 2) AS avg_weather_delay
    FROM Weather_Event we
    JOIN Flight f ON f.originAirport = we.airportCode
    JOIN Flight_Status fs ON fs.flightId = f.flightId AND DATE(fs.flightDate) = DATE(we.startTime)
    WHERE we.airportCode = p_airport_code
      AND (p_start_date IS NULL OR DATE(we.startTime) >= p_start_date)
      AND (p_end_date IS NULL OR DATE(we.startTime) <= p_end_date)
    GROUP BY we.eventId, we.type, we.severity, DATE(we.startTime)
    ORDER BY event_date DESC, avg_departure_delay DESC;
END
";

const GET_AIRLINE_PERFORMANCE_METRICS: &str = r"
CREATE PROCEDURE GetAirlinePerformanceMetrics()
BEGIN
    SELECT
        al.airlineCode,
        al.name AS airline_name,
        COUNT(fs.statusId) AS total_flights,
        ROUND(100.0 * SUM(
            CASE WHEN fs.cancelled = 0 AND fs.diverted = 0 AND COALESCE(fs.departureDelay, 0) <= 15
                 THEN 1 ELSE 0 END
        ) / NULLIF(COUNT(fs.statusId), 0), 2) AS on_time_pct,
        ROUND(AVG(fs.departureDelay), 2) AS avg_departure_delay,
        ROUND(AVG(fs.arrivalDelay), 2) AS avg_arrival_delay,
        ROUND(100.0 * SUM(fs.cancelled) / NULLIF(COUNT(fs.statusId), 0), 2) AS cancellation_pct,
        ROUND(100.0 * SUM(fs.diverted) / NULLIF(COUNT(fs.statusId), 0), 2) AS diversion_pct
    FROM Airline al
    JOIN Flight f ON f.airlineCode = al.airlineCode
    JOIN Flight_Status fs ON fs.flightId = f.flightId
    GROUP BY al.airlineCode, al.name
    ORDER BY on_time_pct DESC;
END
";

// The caller owns the transaction boundary (and its isolation level), so the
// transactional routines below only roll back and re-raise on failure.
//
// @skip_prediction_trigger keeps after_flight_status_update from adding a
// second prediction for the same change.
const UPDATE_FLIGHT_STATUS_WITH_PREDICTION: &str = r"
CREATE PROCEDURE UpdateFlightStatusWithPrediction(
    IN p_flight_id VARCHAR(36),
    IN p_status_id VARCHAR(36),
    IN p_departure_delay DOUBLE,
    IN p_arrival_delay DOUBLE,
    IN p_cancelled BOOLEAN,
    IN p_weather_delay DOUBLE,
    IN p_carrier_delay DOUBLE
)
BEGIN
    DECLARE EXIT HANDLER FOR SQLEXCEPTION
    BEGIN
        SET @skip_prediction_trigger = NULL;
        ROLLBACK;
        RESIGNAL;
    END;

    SET p_cancelled = IFNULL(p_cancelled, FALSE);
    SET @skip_prediction_trigger = 1;

    UPDATE Flight_Status
    SET
        departureDelay = p_departure_delay,
        arrivalDelay = p_arrival_delay,
        cancelled = p_cancelled,
        weatherDelay = p_weather_delay,
        carrierDelay = p_carrier_delay,
        actualDepartureTime = CASE
            WHEN p_departure_delay IS NOT NULL AND p_cancelled = 0 THEN
                (SELECT DATE_ADD(scheduledDepartureTime, INTERVAL p_departure_delay MINUTE)
                 FROM Flight WHERE flightId = p_flight_id)
            ELSE NULL
        END,
        actualArrivalTime = CASE
            WHEN p_arrival_delay IS NOT NULL AND p_cancelled = 0 THEN
                (SELECT DATE_ADD(scheduledArrivalTime, INTERVAL p_arrival_delay MINUTE)
                 FROM Flight WHERE flightId = p_flight_id)
            ELSE NULL
        END
    WHERE statusId = p_status_id;

    SET @skip_prediction_trigger = NULL;

    IF (p_departure_delay > 15 OR p_arrival_delay > 15) AND p_cancelled = 0 THEN
        INSERT INTO Delay_Prediction (
            predictionId,
            flightId,
            predictionTime,
            predictedDepartureDelay,
            predictedArrivalDelay,
            notificationSent,
            predictionReason
        )
        VALUES (
            UUID(),
            p_flight_id,
            NOW(),
            ROUND(p_departure_delay * 1.1, 2),
            ROUND(p_arrival_delay * 1.1, 2),
            FALSE,
            CASE
                WHEN p_weather_delay > 0 THEN 'Weather delay predicted to increase'
                WHEN p_carrier_delay > 0 THEN 'Carrier delay predicted to increase'
                ELSE 'General delay predicted to increase'
            END
        );
    END IF;
END
";

const BULK_CANCELLATION_DUE_TO_WEATHER: &str = r"
CREATE PROCEDURE BulkCancellationDueToWeather(
    IN p_airport_code VARCHAR(10),
    IN p_cancellation_code CHAR(1),
    IN p_weather_event_id VARCHAR(36)
)
BEGIN
    DECLARE v_event_date DATE DEFAULT NULL;
    DECLARE v_affected INT DEFAULT 0;

    DECLARE EXIT HANDLER FOR SQLEXCEPTION
    BEGIN
        ROLLBACK;
        RESIGNAL;
    END;

    SELECT DATE(startTime) INTO v_event_date
    FROM Weather_Event
    WHERE eventId = p_weather_event_id;

    IF v_event_date IS NULL THEN
        SIGNAL SQLSTATE '45000' SET MESSAGE_TEXT = 'Weather event not found';
    END IF;

    UPDATE Flight_Status fs
    JOIN Flight f ON fs.flightId = f.flightId
    SET
        fs.cancelled = TRUE,
        fs.cancellationCode = COALESCE(p_cancellation_code, 'B'),
        fs.actualDepartureTime = NULL,
        fs.actualArrivalTime = NULL
    WHERE f.originAirport = p_airport_code
      AND DATE(fs.flightDate) = v_event_date
      AND fs.cancelled = FALSE;

    SET v_affected = ROW_COUNT();

    SELECT v_affected AS affectedFlights;
END
";

const AFTER_FLIGHT_STATUS_UPDATE: &str = r"
CREATE TRIGGER after_flight_status_update
AFTER UPDATE ON Flight_Status
FOR EACH ROW
BEGIN
    IF @skip_prediction_trigger IS NULL
       AND (NEW.departureDelay > 0 OR NEW.arrivalDelay > 0)
       AND (NOT (OLD.departureDelay <=> NEW.departureDelay)
            OR NOT (OLD.arrivalDelay <=> NEW.arrivalDelay)) THEN
        INSERT INTO Delay_Prediction (
            predictionId,
            flightId,
            predictionTime,
            predictedDepartureDelay,
            predictedArrivalDelay,
            notificationSent,
            predictionReason
        )
        VALUES (
            UUID(),
            NEW.flightId,
            NOW(),
            ROUND(NEW.departureDelay * 1.1, 2),
            ROUND(NEW.arrivalDelay * 1.1, 2),
            FALSE,
            'Auto-generated from status update'
        );
    END IF;
END
";

const BEFORE_FLIGHT_STATUS_INSERT: &str = r"
CREATE TRIGGER before_flight_status_insert
BEFORE INSERT ON Flight_Status
FOR EACH ROW
BEGIN
    IF NEW.departureDelay < 0 THEN
        SET NEW.departureDelay = 0;
    END IF;
    IF NEW.arrivalDelay < 0 THEN
        SET NEW.arrivalDelay = 0;
    END IF;
END
";

const AFTER_WEATHER_EVENT_INSERT: &str = r"
CREATE TRIGGER after_weather_event_insert
AFTER INSERT ON Weather_Event
FOR EACH ROW
BEGIN
    IF NEW.severity IN ('Severe', 'Extreme') THEN
        UPDATE Flight_Status fs
        JOIN Flight f ON fs.flightId = f.flightId
        JOIN Airport a ON f.originAirport = a.airportCode
        SET fs.weatherDelay = COALESCE(fs.weatherDelay, 0) + 30
        WHERE DATE(fs.flightDate) = DATE(NEW.startTime)
          AND SQRT(POW(a.locationLat - NEW.locationLat, 2) + POW(a.locationLng - NEW.locationLng, 2)) <= 2;
    END IF;
END
";
