use crate::codec::encode_packed;
use crate::internals::{CHUNK_PAYLOAD_LEN, LEGACY_VERSION_LEN};
use crate::*;
use std::io::{self, Cursor, Read, Write};

/// In-memory device: replays `input` and records everything written.
#[derive(Debug, Default)]
struct MockStream {
    input: Cursor<Vec<u8>>,
    written: Vec<u8>,
    reads: usize,
}

impl MockStream {
    fn new(input: Vec<u8>) -> MockStream {
        MockStream {
            input: Cursor::new(input),
            ..MockStream::default()
        }
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        self.input.read(buf)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn device(input: Vec<u8>) -> ScipDevice<MockStream> {
    ScipDevice::with_stream(Box::new(MockStream::new(input))).unwrap()
}

fn written(mut device: ScipDevice<MockStream>) -> Vec<u8> {
    device.disconnect().unwrap().written
}

/// Reply header: echo, status, sum character, two line feeds.
fn header(echo: &[u8], status: &[u8]) -> Vec<u8> {
    let mut out = echo.to_vec();
    out.extend_from_slice(status);
    out.extend_from_slice(b"P\n\n");
    out
}

fn packed(values: &[u32], width: usize) -> Vec<u8> {
    values.iter().flat_map(|v| encode_packed(*v, width)).collect()
}

/// Echo, status, timestamp and chunked payload of one measurement reply.
fn scan_reply(echo: &[u8], timestamp: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = echo.to_vec();
    out.extend_from_slice(b"99b\n");
    out.extend_from_slice(&encode_packed(timestamp, 4));
    out.extend_from_slice(b"X\n");
    for piece in payload.chunks(CHUNK_PAYLOAD_LEN) {
        out.extend_from_slice(piece);
        out.extend_from_slice(b"S\n");
    }
    out.push(b'\n');
    out
}

/// Distances for steps 44..=725; sample 644 spans offsets 13..15 of the 31st chunk and is 0.
fn full_range_distances() -> Vec<u32> {
    let mut distances: Vec<u32> = (0..682).map(|i| 4200 + i).collect();
    distances[644] = 0;
    distances
}

fn full_range_options() -> ScanOptions {
    ScanOptions {
        encoding: Encoding::Three,
        start_step: 44,
        end_step: 725,
        cluster_count: 1,
        scan_interval: 0,
        scan_count: 1,
    }
}

#[test]
fn distance_scan_end_to_end() {
    let distances = full_range_distances();
    let mut input = header(b"MD0044072501001\n", b"00");
    input.extend(scan_reply(
        b"MD0044072501000\n",
        123_456,
        &packed(&distances, 3),
    ));

    let mut lidar = device(input);
    lidar.start_distance_scan(&full_range_options(), "").unwrap();

    let config = lidar.scan_config().unwrap().clone();
    assert_eq!(config.header_len, 21);
    assert_eq!(config.kind, ScanKind::Distance);
    assert_eq!(&config.tag, b"MD");

    let scan = lidar.fetch_scan().unwrap();
    assert_eq!(scan.timestamp, 123_456);
    assert_eq!(scan.distances.len(), 725 - 44 + 1);
    assert_eq!(scan.distances, distances);
    assert!(scan.intensities.is_empty());
    assert!(lidar.scan_config().is_some());

    assert_eq!(written(lidar), b"MD0044072501001\n");
}

#[test]
fn continuous_scan_is_repeatable() {
    let distances = full_range_distances();
    let options = ScanOptions {
        encoding: Encoding::Three,
        scan_count: 0,
        ..full_range_options()
    };
    let mut input = header(b"MD0044072501000\n", b"00");
    input.extend(scan_reply(b"MD0044072501000\n", 10, &packed(&distances, 3)));
    input.extend(scan_reply(b"MD0044072501000\n", 110, &packed(&distances, 3)));

    let mut lidar = device(input);
    lidar.start_distance_scan(&options, "").unwrap();
    assert_eq!(lidar.fetch_scan().unwrap().timestamp, 10);
    assert_eq!(lidar.fetch_scan().unwrap().timestamp, 110);
}

#[test]
fn trailing_string_extends_header() {
    let mut lidar = device(header(b"MS0000001000000abc\n", b"00"));
    let options = ScanOptions {
        encoding: Encoding::Two,
        start_step: 0,
        end_step: 10,
        cluster_count: 0,
        scan_interval: 0,
        scan_count: 0,
    };
    lidar.start_distance_scan(&options, "abc").unwrap();
    assert_eq!(lidar.scan_config().unwrap().header_len, 24);
    assert_eq!(lidar.scan_config().unwrap().echo_len(), 19);
}

#[test]
fn intensity_scan_alternates_values() {
    // 96 two-byte groups; 70 and 71 put the end marker into the third chunk
    let mut values: Vec<u32> = (0..96).map(|i| 100 + i * 37).collect();
    values[70] = 0;
    values[71] = 0;

    let mut input = header(b"GS0000004701\n", b"00");
    input.extend(scan_reply(b"GS000000", 77, &packed(&values, 2)));

    let mut lidar = device(input);
    let options = ScanOptions {
        encoding: Encoding::Two,
        ..ScanOptions::with_range(0, 47)
    };
    lidar.start_intensity_scan(&options, "").unwrap();
    assert_eq!(lidar.scan_config().unwrap().header_len, 18);

    let scan = lidar.fetch_scan().unwrap();
    assert_eq!(scan.timestamp, 77);
    assert_eq!(scan.distances.len(), 48);
    assert_eq!(scan.intensities.len(), 48);
    assert_eq!(scan.distances[0], values[0]);
    assert_eq!(scan.intensities[0], values[1]);
    assert_eq!(scan.distances[35], 0);
    assert_eq!(scan.intensities[35], 0);
}

#[test]
fn fetch_without_scan_is_precondition_error() {
    let mut lidar = device(b"unused".to_vec());
    assert!(matches!(
        lidar.fetch_scan(),
        Err(Error::PreconditionError { .. })
    ));
    let stream = lidar.disconnect().unwrap();
    assert!(stream.written.is_empty());
    assert_eq!(stream.reads, 0);
}

#[test]
fn disconnected_device_rejects_commands() {
    let mut lidar: ScipDevice<MockStream> = ScipDevice::new();
    assert!(!lidar.is_connected());
    assert!(matches!(lidar.fetch_scan(), Err(Error::PreconditionError { .. })));
    assert!(matches!(lidar.laser_on(""), Err(Error::PreconditionError { .. })));
    assert!(matches!(lidar.disconnect(), Err(Error::PreconditionError { .. })));
}

#[test]
fn connect_twice_fails() {
    let mut lidar = device(Vec::new());
    let again = lidar.connect(Box::new(MockStream::new(Vec::new())), &ConnectOptions::default());
    assert!(matches!(again, Err(Error::PreconditionError { .. })));
    assert!(lidar.is_connected());
}

#[test]
fn rejected_scan_keeps_previous_configuration() {
    let mut lidar = device(header(b"MD0725004401000\n", b"05"));
    let options = ScanOptions {
        scan_count: 0,
        ..ScanOptions::with_range(725, 44)
    };
    match lidar.start_distance_scan(&options, "") {
        Err(Error::StatusError { code, description }) => {
            assert_eq!(code, "05");
            assert_eq!(description, Some("End Step is smaller than Starting Step"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(lidar.scan_config().is_none());
}

#[test]
fn unknown_scan_status_surfaces_code() {
    let distances = full_range_distances();
    let mut input = header(b"MD0044072501001\n", b"00");
    let mut reply = scan_reply(b"MD0044072501000\n", 1, &packed(&distances, 3));
    reply[16..18].copy_from_slice(b"77");
    input.extend(reply);

    let mut lidar = device(input);
    lidar.start_distance_scan(&full_range_options(), "").unwrap();
    match lidar.fetch_scan() {
        Err(Error::StatusError { code, description }) => {
            assert_eq!(code, "77");
            assert!(description.is_none());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn truncated_scan_is_short_frame() {
    let distances = full_range_distances();
    let mut input = header(b"MD0044072501001\n", b"00");
    let reply = scan_reply(b"MD0044072501000\n", 1, &packed(&distances, 3));
    input.extend_from_slice(&reply[..reply.len() - 40]);

    let mut lidar = device(input);
    lidar.start_distance_scan(&full_range_options(), "").unwrap();
    assert!(matches!(lidar.fetch_scan(), Err(Error::ShortFrame { .. })));
}

#[test]
fn laser_and_reset_track_state() {
    let mut input = header(b"BM\n", b"00");
    input.extend(header(b"MD0044072501001\n", b"00"));
    input.extend(header(b"QT\n", b"00"));
    input.extend(header(b"RS\n", b"00"));

    let mut lidar = device(input);
    lidar.laser_on("").unwrap();
    assert!(lidar.is_laser_on());
    lidar.start_distance_scan(&full_range_options(), "").unwrap();
    lidar.laser_off("").unwrap();
    assert!(!lidar.is_laser_on());
    assert!(lidar.scan_config().is_some());
    lidar.reset("").unwrap();
    assert!(lidar.scan_config().is_none());

    assert_eq!(written(lidar), b"BM\nMD0044072501001\nQT\nRS\n");
}

#[test]
fn laser_on_error_is_reported() {
    let mut lidar = device(header(b"BMid\n", b"98"));
    assert!(matches!(
        lidar.laser_on("id"),
        Err(Error::StatusError {
            description: Some("Resumption of process after confirming normal laser operation"),
            ..
        })
    ));
    assert!(!lidar.is_laser_on());
}

#[test]
fn time_request_returns_device_time() {
    let mut input = b"TM0\n00P\n\n".to_vec();
    input.extend_from_slice(b"TM1\n00P\n");
    input.extend(encode_packed(16_000_000, 4));
    input.extend_from_slice(b"Q\n\n");
    input.extend_from_slice(b"TM2\n00P\n\n");

    let mut lidar = device(input);
    assert_eq!(lidar.time_sync(TimeControl::AdjustOn, "").unwrap(), None);
    assert_eq!(
        lidar.time_sync(TimeControl::Request, "").unwrap(),
        Some(16_000_000)
    );
    assert_eq!(lidar.time_sync(TimeControl::AdjustOff, "").unwrap(), None);
    assert_eq!(written(lidar), b"TM0\nTM1\nTM2\n");
}

#[test]
fn time_adjust_errors_use_their_own_table() {
    let mut lidar = device(b"TM0\n02".to_vec());
    assert!(matches!(
        lidar.time_sync(TimeControl::AdjustOn, ""),
        Err(Error::StatusError {
            description: Some("Adjust mode on when already on"),
            ..
        })
    ));
}

#[test]
fn bit_rate_literal_is_validated_before_sending() {
    let mut lidar = device(Vec::new());
    assert!(matches!(
        lidar.set_bit_rate("9600", ""),
        Err(Error::InvalidArgument { .. })
    ));
    assert!(written(lidar).is_empty());

    let mut lidar = device(header(b"SS115200\n", b"03"));
    assert!(matches!(
        lidar.set_bit_rate("115200", ""),
        Err(Error::StatusError {
            description: Some("Sensor is already running at defined bit rate"),
            ..
        })
    ));
}

#[test]
fn sensitivity_and_motor_speed() {
    let mut input = header(b"HS1\n", b"00");
    input.extend_from_slice(b"CR03\n\n00P\n\n");
    input.extend_from_slice(b"CR99\n\n02P\n\n");

    let mut lidar = device(input);
    lidar.set_sensitivity(Sensitivity::High, "").unwrap();
    lidar.set_motor_speed(3, "").unwrap();
    assert!(matches!(
        lidar.set_motor_speed(99, ""),
        Err(Error::StatusError {
            description: Some("Speed ratio out of range"),
            ..
        })
    ));
    assert_eq!(written(lidar), b"HS1\nCR03\nCR99\n");
}

#[test]
fn parameter_lines_are_cut_at_semicolon() {
    let mut input = b"PP\n00P\n".to_vec();
    input.extend_from_slice(
        b"MODL:URG-04LX(Hokuyo Automatic Co.,Ltd.);[\nDMIN:20;4\nDMAX:5600;_\nARES:1024;\\\nAMIN:44;7\n\n",
    );

    let mut lidar = device(input);
    let params = lidar.parameters("").unwrap();
    assert_eq!(
        params,
        vec![
            "MODL:URG-04LX(Hokuyo Automatic Co.,Ltd.)",
            "DMIN:20",
            "DMAX:5600",
            "ARES:1024",
            "AMIN:44",
        ]
    );
}

#[test]
fn state_info_reads_seven_lines() {
    let mut input = b"IIxy\n00P\n".to_vec();
    input.extend_from_slice(b"MODL:URG;a\nLASR:OFF;b\nSCSP:600;c\nMESM:Idle;d\nSBPS:USB;e\nTIME:0;f\n\n");

    let mut lidar = device(input);
    let info = lidar.state_info("xy").unwrap();
    assert_eq!(info.len(), 6);
    assert_eq!(info[1], "LASR:OFF");
}

#[test]
fn version_in_current_mode_joins_detail_lines() {
    let mut input = b"VV\n00P\n".to_vec();
    input.extend_from_slice(b"VEND:Hokuyo;[\nPROD:URG-04LX;[\nFIRM:3.4.03;x\nPROT:SCIP 2.0;N\n\n");

    let mut lidar = device(input);
    assert_eq!(
        lidar.version().unwrap(),
        "VEND:Hokuyo\nPROD:URG-04LX\nFIRM:3.4.03\nPROT:SCIP 2.0"
    );
}

#[test]
fn legacy_version_reads_fixed_block() {
    let mut block = b"V\n0\nVEND:Hokuyo\n".to_vec();
    block.resize(LEGACY_VERSION_LEN, 0);

    let mut lidar = ScipDevice::new();
    lidar
        .connect(
            Box::new(MockStream::new(block)),
            &ConnectOptions {
                boot_protocol: ProtocolMode::Legacy,
                normalize: false,
            },
        )
        .unwrap();
    assert_eq!(lidar.protocol_mode(), ProtocolMode::Legacy);
    assert_eq!(lidar.version().unwrap(), "V\n0\nVEND:Hokuyo");
    assert_eq!(written(lidar), b"V\n");
}

#[test]
fn legacy_device_is_normalized_on_connect() {
    let options = ConnectOptions {
        boot_protocol: ProtocolMode::Legacy,
        normalize: true,
    };

    let mut lidar = ScipDevice::new();
    lidar
        .connect(Box::new(MockStream::new(header(b"SCIP2.0\n", b"00"))), &options)
        .unwrap();
    assert_eq!(lidar.protocol_mode(), ProtocolMode::Current);
    assert_eq!(written(lidar), b"SCIP2.0\n");

    let mut lidar: ScipDevice<MockStream> = ScipDevice::new();
    let result = lidar.connect(Box::new(MockStream::new(b"SCIP2.0\n0".to_vec())), &options);
    assert!(matches!(result, Err(Error::ShortFrame { expected: 13, .. })));
    assert!(!lidar.is_connected());
}

#[test]
fn cartesian_conversion_uses_active_configuration() {
    let mut lidar = device(header(b"MD0044072501001\n", b"00"));
    assert!(lidar.to_cartesian(&[1000]).is_err());

    lidar.start_distance_scan(&full_range_options(), "").unwrap();
    assert!((lidar.angular_step().unwrap() - 360.0 / 1024.0).abs() < 1e-12);
    let points = lidar.to_cartesian(&[1000, 10]).unwrap();
    assert_eq!(points.len(), 2);
    let first_angle = utils::default_angle_min().to_radians();
    assert!((points[0].x - 1000.0 * first_angle.cos()).abs() < 1e-9);
    assert_eq!(points[1], Point { x: 0.0, y: 0.0 });
}

#[test]
fn long_trailing_string_is_cut_in_header_and_echo() {
    let trailing = "0123456789abcdefXYZ";
    let mut input = header(b"MD00440725010010123456789abcdef\n", b"00");
    let distances = full_range_distances();
    input.extend(scan_reply(
        b"MD00440725010000123456789abcdef\n",
        77,
        &packed(&distances, 3),
    ));

    let mut lidar = device(input);
    lidar.start_distance_scan(&full_range_options(), trailing).unwrap();
    let config = lidar.scan_config().unwrap().clone();
    assert_eq!(config.header_len, 21 + 16);
    assert_eq!(config.echo_len(), 32);

    let scan = lidar.fetch_scan().unwrap();
    assert_eq!(scan.timestamp, 77);
    assert_eq!(scan.distances, distances);
    assert_eq!(written(lidar), b"MD00440725010010123456789abcdef\n");
}

#[test]
fn overwide_end_step_still_fetches() {
    let options = ScanOptions {
        encoding: Encoding::Two,
        end_step: u32::MAX,
        ..full_range_options()
    };
    // 2 * (u32::MAX - 44 + 1) bytes leave 40 in the last chunk; 13..15 of the first is "00".
    let mut distances: Vec<u32> = (0..52).map(|i| 300 + i).collect();
    distances[6] = 0;
    distances[7] = 0;
    let mut input = header(b"MS0044429401001\n", b"00");
    input.extend(scan_reply(b"MS0044429401000\n", 5, &packed(&distances, 2)));

    let mut lidar = device(input);
    lidar.start_distance_scan(&options, "").unwrap();
    assert_eq!(lidar.scan_config().unwrap().trailing_chunk_len(), Some(40));

    let scan = lidar.fetch_scan().unwrap();
    assert_eq!(scan.timestamp, 5);
    assert_eq!(scan.distances, distances);
    assert_eq!(written(lidar), b"MS0044429401001\n");
}

#[test]
fn overwide_cluster_count_keeps_geometry_finite() {
    let options = ScanOptions {
        cluster_count: 5_000_000,
        ..full_range_options()
    };
    let mut lidar = device(header(b"MD0044072550001\n", b"00"));
    lidar.start_distance_scan(&options, "").unwrap();

    let step = lidar.angular_step().unwrap();
    assert!(step > 0.0 && step < 1e-6);
    assert_eq!(lidar.to_cartesian(&[1000, 1000]).unwrap().len(), 2);
    assert_eq!(written(lidar), b"MD0044072550001\n");
}
