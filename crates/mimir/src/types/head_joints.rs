use super::joints;

joints! {
    /// Wrapper struct containing the head joints of the robot.
    HeadJoints { yaw, pitch }
}
